//! Configuration module for Tidemark
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so a crawl can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use tidemark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tidemark.toml")).unwrap();
//! println!("Fallback delay: {}s", config.crawler.politeness_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_MAX_BYTES,
    DEFAULT_POLITENESS_DELAY, DEFAULT_REQUEST_TIMEOUT,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
