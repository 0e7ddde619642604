//! Output module for writing crawl results
//!
//! This module handles:
//! - Naming the per-run result and log files
//! - Writing the page→text mapping as JSON
//! - Recording crawl statistics

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};

use crate::state::Results;
use crate::CrawlError;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// UTC timestamp shared by the result and log file names of one run
///
/// Millisecond precision so back-to-back runs do not collide.
pub fn run_stamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

pub fn results_path(dir: &Path, stamp: &str) -> PathBuf {
    dir.join(format!("crawl-{}.json", stamp))
}

pub fn log_path(dir: &Path, stamp: &str) -> PathBuf {
    dir.join(format!("crawl-{}.log", stamp))
}

/// Writes the results as a pretty-printed JSON object
///
/// Keys are page paths in sorted order; values are the text fragments of
/// each page. Returns the path of the written file.
///
/// # Arguments
///
/// * `results` - The crawl results
/// * `dir` - Output directory, which must exist
/// * `stamp` - The run stamp from [`run_stamp`]
pub fn write_results(results: &Results, dir: &Path, stamp: &str) -> Result<PathBuf, CrawlError> {
    let path = results_path(dir, stamp);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} pages to {}", results.len(), path.display());
    Ok(path)
}
