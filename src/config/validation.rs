use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Smallest byte ceiling accepted for page and sitemap bodies
const MIN_BYTE_CEILING: usize = 1024;

/// Longest fallback politeness delay accepted, in seconds (one day)
const MAX_POLITENESS_DELAY: f64 = 86_400.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1s, got 0".to_string(),
        ));
    }

    if !config.politeness_delay.is_finite() || config.politeness_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "politeness_delay must be a non-negative number of seconds, got {}",
            config.politeness_delay
        )));
    }

    if config.politeness_delay > MAX_POLITENESS_DELAY {
        return Err(ConfigError::Validation(format!(
            "politeness_delay must be <= {}s, got {}",
            MAX_POLITENESS_DELAY, config.politeness_delay
        )));
    }

    if config.max_page_bytes < MIN_BYTE_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_page_bytes must be >= {} bytes, got {}",
            MIN_BYTE_CEILING, config.max_page_bytes
        )));
    }

    if config.max_sitemap_bytes < MIN_BYTE_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_sitemap_bytes must be >= {} bytes, got {}",
            MIN_BYTE_CEILING, config.max_sitemap_bytes
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
