//! Robots.txt handling module
//!
//! This module provides the politeness gate: robots.txt is fetched and parsed
//! once before the crawl starts, and every later permission, delay and sitemap
//! question is answered from that single snapshot.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Fetcher;
use std::time::Duration;

/// Robots exclusion policy for the crawl target
///
/// Starts `Unloaded` and becomes `Loaded` exactly once. An unloaded gate
/// answers like an allow-all policy.
#[derive(Debug, Clone, Default)]
pub enum PolitenessGate {
    #[default]
    Unloaded,
    Loaded(ParsedRobots),
}

impl PolitenessGate {
    /// Fetches and parses `/robots.txt` from the crawl target
    ///
    /// Never fails: a missing, unreachable, oversized or undecodable policy
    /// yields allow-all with no delay and no sitemaps. Calling this on a
    /// loaded gate keeps the existing policy.
    pub async fn load(&mut self, fetcher: &Fetcher) {
        if self.is_loaded() {
            tracing::warn!("robots.txt already loaded, keeping the existing policy");
            return;
        }

        let body = fetcher.fetch_robots().await;
        self.load_from(body.as_deref());
    }

    /// Loads the gate from an already fetched robots.txt body
    ///
    /// `None` means the policy could not be obtained.
    pub fn load_from(&mut self, body: Option<&str>) {
        if self.is_loaded() {
            return;
        }

        let robots = match body {
            Some(content) => {
                tracing::info!("robots.txt loaded ({} bytes)", content.len());
                ParsedRobots::from_content(content)
            }
            None => {
                tracing::info!("No robots.txt policy, allowing everything");
                ParsedRobots::allow_all()
            }
        };

        *self = Self::Loaded(robots);
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Checks whether `user_agent` may fetch `path`
    pub fn can_fetch(&self, user_agent: &str, path: &str) -> bool {
        match self {
            Self::Unloaded => true,
            Self::Loaded(robots) => robots.is_allowed(path, user_agent),
        }
    }

    /// The Crawl-delay declared for `user_agent`, if any
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(robots) => robots.crawl_delay(user_agent),
        }
    }

    /// Sitemap locations declared by the policy
    pub fn sitemaps(&self) -> &[String] {
        match self {
            Self::Unloaded => &[],
            Self::Loaded(robots) => robots.sitemaps(),
        }
    }
}
