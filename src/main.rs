//! Tidemark main entry point
//!
//! This is the command-line interface for the Tidemark single-host crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tidemark::config::{load_or_default, validate, Config};
use tidemark::output::{log_path, print_statistics, run_stamp, write_results};
use tidemark::{Crawler, Target};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Tidemark: a polite single-host web crawler
///
/// Tidemark walks every page of one host reachable through links and sitemap
/// entries, respecting robots.txt, and writes the text found on each page as
/// a JSON document.
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(version)]
#[command(about = "A polite single-host web crawler", long_about = None)]
struct Cli {
    /// Root URL of the site to crawl (scheme and host required)
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Delay between requests when robots.txt declares none, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Byte ceiling for page and sitemap bodies
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<usize>,

    /// Directory for the result and log files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    let target = Target::parse(&cli.root_url)
        .with_context(|| format!("Invalid root URL: {}", cli.root_url))?;

    if cli.dry_run {
        setup_logging(cli.verbose, cli.quiet, None)?;
        handle_dry_run(&config, &target);
        return Ok(());
    }

    let output_dir = config.output.directory.clone();
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let stamp = run_stamp();
    setup_logging(cli.verbose, cli.quiet, Some(&log_path(&output_dir, &stamp)))?;

    handle_crawl(&cli.root_url, &config, &stamp).await
}

/// Loads the configuration file (or defaults) and applies CLI overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;

    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout = timeout;
    }
    if let Some(delay) = cli.delay {
        config.crawler.politeness_delay = delay;
    }
    if let Some(max_bytes) = cli.max_bytes {
        config.crawler.max_page_bytes = max_bytes;
        config.crawler.max_sitemap_bytes = max_bytes;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Events go to stderr and, when a path is given, are appended to that file
/// without ANSI colors.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidemark=info,warn"),
            1 => EnvFilter::new("tidemark=debug,info"),
            2 => EnvFilter::new("tidemark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the logging subscriber")?;

    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration and target
fn handle_dry_run(config: &Config, target: &Target) {
    println!("=== Tidemark Dry Run ===\n");

    println!("Target:");
    println!("  Origin: {}", target.origin());
    println!("  Host: {}", target.netloc());

    println!("\nCrawler Configuration:");
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Politeness delay: {}s", config.crawler.politeness_delay);
    println!("  Max page bytes: {}", config.crawler.max_page_bytes);
    println!("  Max sitemap bytes: {}", config.crawler.max_sitemap_bytes);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  Robots token: {}", config.user_agent.crawler_name);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}/", target.origin());
}

/// Handles the main crawl operation
async fn handle_crawl(root_url: &str, config: &Config, stamp: &str) -> Result<()> {
    let crawler = Crawler::new(root_url, config)?;
    tracing::info!("Crawling host {}", crawler.target().netloc());

    let report = match crawler.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("Crawl aborted");
        }
    };

    let path = write_results(&report.results, &config.output.directory, stamp)
        .context("Failed to write crawl results")?;

    if let Ok(json) = serde_json::to_string(&report.statistics) {
        tracing::info!("Statistics: {}", json);
    }

    print_statistics(&report.statistics);
    println!("\n✓ Results written to: {}", path.display());

    Ok(())
}
