use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 3600;

/// Default politeness delay in seconds when robots.txt declares none
pub const DEFAULT_POLITENESS_DELAY: f64 = 1.0;

/// Default byte ceiling for page and sitemap bodies (256 KiB)
pub const DEFAULT_MAX_BYTES: usize = 256 * 1024;

/// Main configuration structure for Tidemark
///
/// Every section and field is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Wait before each dequeue when robots.txt has no Crawl-delay (seconds)
    #[serde(rename = "politeness-delay")]
    pub politeness_delay: f64,

    /// Hard read limit for page bodies
    #[serde(rename = "max-page-bytes")]
    pub max_page_bytes: usize,

    /// Hard read limit for sitemap and robots.txt bodies
    #[serde(rename = "max-sitemap-bytes")]
    pub max_sitemap_bytes: usize,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Fallback delay between requests; an unrepresentable value means the default
    pub fn politeness_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.politeness_delay)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_POLITENESS_DELAY))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            max_page_bytes: DEFAULT_MAX_BYTES,
            max_sitemap_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the product token matched against robots.txt
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Tidemark".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/tidemark-crawler/tidemark".to_string(),
            contact_email: "crawler@tidemark.invalid".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the per-run results and log files
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}
