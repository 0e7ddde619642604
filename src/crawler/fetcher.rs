//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent string
//! - Bounded GET requests against the crawl target
//! - Content-Type and body size filtering
//! - Classifying failures into recoverable outcomes and fatal errors

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::{PagePath, Target};
use crate::CrawlError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;

/// Why a successfully answered request produced no content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Content-Type is not `text/html`
    ContentType,
    /// Declared or actual body size exceeds the ceiling
    TooLarge,
    /// Body is not valid UTF-8
    DecodeError,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentType => "content-type",
            Self::TooLarge => "too-large",
            Self::DecodeError => "decode-error",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a fetch operation
///
/// Statuses other than 200 and 404 are not outcomes: they come back as
/// [`CrawlError::UnexpectedStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Decoded body text
    Success(String),

    /// HTTP 404
    NotFound,

    /// Answered with 200 but the body was not usable
    Skipped(SkipReason),

    /// Timeout or connection failure
    TimedOut,
}

impl FetchOutcome {
    /// The fetched text, if the fetch succeeded
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Success(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => write!(f, "success ({} bytes)", text.len()),
            Self::NotFound => f.write_str("not found"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed: every request stays on the crawl target and a
/// 3xx answer surfaces as an unexpected status.
///
/// # Example
///
/// ```no_run
/// use tidemark::config::UserAgentConfig;
/// use tidemark::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Which Content-Types a request accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentFilter {
    HtmlOnly,
    Any,
}

/// Performs bounded GET requests against the crawl target
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    target: Target,
    timeout: Duration,
    max_page_bytes: usize,
    max_sitemap_bytes: usize,
}

impl Fetcher {
    pub fn new(client: Client, target: Target, config: &CrawlerConfig) -> Self {
        Self {
            client,
            target,
            timeout: config.request_timeout(),
            max_page_bytes: config.max_page_bytes,
            max_sitemap_bytes: config.max_sitemap_bytes,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fetches one page
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout / connection failure | `TimedOut` |
    /// | HTTP 404 | `NotFound` |
    /// | Any other non-200 | `Err(UnexpectedStatus)` |
    /// | Content-Type not `text/html` | `Skipped(content-type)` |
    /// | Body above `max-page-bytes` | `Skipped(too-large)` |
    /// | Body not UTF-8 | `Skipped(decode-error)` |
    /// | Otherwise | `Success(text)` |
    pub async fn fetch(&self, page: &PagePath) -> Result<FetchOutcome, CrawlError> {
        self.get(page, ContentFilter::HtmlOnly, self.max_page_bytes)
            .await
    }

    /// Fetches a sitemap document: any Content-Type, sitemap byte ceiling
    pub async fn fetch_sitemap(&self, path: &PagePath) -> Result<FetchOutcome, CrawlError> {
        self.get(path, ContentFilter::Any, self.max_sitemap_bytes)
            .await
    }

    /// Fetches `/robots.txt`, returning `None` on any failure
    pub async fn fetch_robots(&self) -> Option<String> {
        let path = PagePath::from_parts("/robots.txt", None);

        match self
            .get(&path, ContentFilter::Any, self.max_sitemap_bytes)
            .await
        {
            Ok(FetchOutcome::Success(body)) => Some(body),
            Ok(outcome) => {
                tracing::info!("robots.txt unavailable: {}", outcome);
                None
            }
            Err(e) => {
                tracing::warn!("robots.txt unavailable: {}", e);
                None
            }
        }
    }

    async fn get(
        &self,
        path: &PagePath,
        filter: ContentFilter,
        limit: usize,
    ) -> Result<FetchOutcome, CrawlError> {
        let url = self.target.url_for(path);
        tracing::debug!("Getting content from {} ...", url);

        let mut request = self.client.get(&url).timeout(self.timeout);
        if filter == ContentFilter::HtmlOnly {
            request = request.header(ACCEPT, "text/html");
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Timeout exceeded for {}, no content got: {}", url, e);
                return Ok(FetchOutcome::TimedOut);
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!("[{}]: {}", status.as_u16(), url);
            return Ok(FetchOutcome::NotFound);
        }

        if status != StatusCode::OK {
            tracing::error!("HTTP status {} not managed for {}", status.as_u16(), url);
            return Err(CrawlError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if filter == ContentFilter::HtmlOnly
            && !content_type.to_ascii_lowercase().starts_with("text/html")
        {
            tracing::warn!("Content of {} ignored, type: {:?}", url, content_type);
            return Ok(FetchOutcome::Skipped(SkipReason::ContentType));
        }

        if let Some(declared) = response.content_length() {
            if declared > limit as u64 {
                tracing::warn!(
                    "Content of {} ignored, declared length {} exceeds {}",
                    url,
                    declared,
                    limit
                );
                return Ok(FetchOutcome::Skipped(SkipReason::TooLarge));
            }
        }

        let body = match read_limited(response, limit).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                tracing::warn!("Content of {} ignored, body exceeds {} bytes", url, limit);
                return Ok(FetchOutcome::Skipped(SkipReason::TooLarge));
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Timeout exceeded while reading {}", url);
                return Ok(FetchOutcome::TimedOut);
            }
            Err(source) => return Err(CrawlError::Http { url, source }),
        };

        match String::from_utf8(body) {
            Ok(text) => Ok(FetchOutcome::Success(text)),
            Err(_) => {
                tracing::error!("Decoding of {} failed, type: {:?}", url, content_type);
                Ok(FetchOutcome::Skipped(SkipReason::DecodeError))
            }
        }
    }
}

/// Reads the body chunk by chunk, giving up once it grows past `limit`
///
/// Returns `Ok(None)` when the ceiling was crossed. The rest of the body is
/// never read, whatever Content-Length claimed.
async fn read_limited(mut response: Response, limit: usize) -> Result<Option<Vec<u8>>, reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Some(body))
}
