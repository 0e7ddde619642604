//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Bounded HTTP fetching with content filtering
//! - Link, text and sitemap extraction
//! - The FIFO frontier
//! - Overall crawl coordination

mod coordinator;
mod extract;
mod fetcher;
mod frontier;

pub use coordinator::Crawler;
pub use extract::{extract_links, extract_sitemap_locations, extract_text};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, SkipReason};
pub use frontier::Frontier;

pub use crate::state::CrawlReport;
