//! Crawl statistics
//!
//! Counters accumulated by the crawl loop and rendered once the run ends.

use crate::crawler::{FetchOutcome, SkipReason};
use serde::Serialize;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    /// Pages entered into the results, failed fetches included
    pub pages_recorded: u64,

    /// Fetches that returned usable HTML
    pub fetched_ok: u64,

    /// Fetches answered with 404
    pub not_found: u64,

    /// Pages skipped for their Content-Type
    pub skipped_content_type: u64,

    /// Pages skipped for exceeding the byte ceiling
    pub skipped_too_large: u64,

    /// Pages skipped because the body was not UTF-8
    pub skipped_decode_error: u64,

    /// Fetches that timed out or could not connect
    pub timed_out: u64,

    /// Dequeued pages refused by robots.txt
    pub robots_denied: u64,

    /// Dequeued pages that were already recorded
    pub duplicates_discarded: u64,

    /// Links pointing at another host
    pub cross_host_discarded: u64,

    /// Frontier entries seeded from sitemaps
    pub sitemap_entries: u64,
}

impl CrawlStatistics {
    /// Counts the outcome of one page fetch
    pub fn record_outcome(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(_) => self.fetched_ok += 1,
            FetchOutcome::NotFound => self.not_found += 1,
            FetchOutcome::Skipped(SkipReason::ContentType) => self.skipped_content_type += 1,
            FetchOutcome::Skipped(SkipReason::TooLarge) => self.skipped_too_large += 1,
            FetchOutcome::Skipped(SkipReason::DecodeError) => self.skipped_decode_error += 1,
            FetchOutcome::TimedOut => self.timed_out += 1,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_content_type + self.skipped_too_large + self.skipped_decode_error
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.pages_recorded);
    println!("  Sitemap entries seeded: {}", stats.sitemap_entries);
    println!();

    println!("Fetch Outcomes:");
    println!("  OK: {}", stats.fetched_ok);
    println!("  Not found: {}", stats.not_found);
    println!("  Timed out: {}", stats.timed_out);
    println!("  Skipped: {}", stats.skipped());
    if stats.skipped() > 0 {
        println!("    {}: {}", SkipReason::ContentType, stats.skipped_content_type);
        println!("    {}: {}", SkipReason::TooLarge, stats.skipped_too_large);
        println!("    {}: {}", SkipReason::DecodeError, stats.skipped_decode_error);
    }
    println!();

    println!("Discarded:");
    println!("  Robots denied: {}", stats.robots_denied);
    println!("  Duplicates: {}", stats.duplicates_discarded);
    println!("  Cross-host links: {}", stats.cross_host_discarded);
    println!();

    let success_rate = if stats.pages_recorded > 0 {
        (stats.fetched_ok as f64 / stats.pages_recorded as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched with content)",
        success_rate, stats.fetched_ok, stats.pages_recorded
    );
}
