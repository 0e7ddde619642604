//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Loading the robots.txt policy of the target
//! - Seeding the frontier from declared sitemaps
//! - The wait / dequeue / politeness-check / fetch / extract / enqueue cycle
//! - Handing the finished session back as a report
//!
//! Each phase takes the [`CrawlSession`] by value and returns it, so a
//! session can only be observed in the phase that currently owns it.

use crate::config::Config;
use crate::crawler::{
    build_http_client, extract_links, extract_sitemap_locations, extract_text, FetchOutcome,
    Fetcher,
};
use crate::robots::PolitenessGate;
use crate::state::{CrawlPhase, CrawlReport, CrawlSession};
use crate::url::{normalize, PagePath, Target};
use crate::CrawlError;
use std::time::{Duration, Instant};

/// Single-host breadth-first crawler
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    /// Product token matched against robots.txt groups
    agent: String,
    /// Delay used when robots.txt declares no Crawl-delay
    fallback_delay: Duration,
}

impl Crawler {
    /// Creates a crawler for the host of `root`
    ///
    /// # Arguments
    ///
    /// * `root` - Root URL; only its scheme and authority are used
    /// * `config` - Validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - Invalid root URL or HTTP client failure
    pub fn new(root: &str, config: &Config) -> Result<Self, CrawlError> {
        let target = Target::parse(root)?;
        let client = build_http_client(&config.user_agent)?;

        Ok(Self {
            fetcher: Fetcher::new(client, target, &config.crawler),
            agent: config.user_agent.crawler_name.clone(),
            fallback_delay: config.crawler.politeness_delay(),
        })
    }

    pub fn target(&self) -> &Target {
        self.fetcher.target()
    }

    /// Runs the crawl to completion
    ///
    /// Stops when the frontier is empty. Any page answered with a status
    /// other than 200 or 404 aborts the crawl with
    /// [`CrawlError::UnexpectedStatus`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidemark::{Config, Crawler};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new("http://localhost:8000", &Config::default())?;
    /// let report = crawler.run().await?;
    /// println!("{} pages", report.results.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        tracing::info!("Starting crawl of {}", self.target().origin());
        let start_time = Instant::now();

        let session = CrawlSession::new();
        let session = self.load_policy(session).await?;
        let session = self.seed_from_sitemaps(session).await?;
        let session = self.crawl_frontier(session).await?;
        let report = session.finish()?;

        tracing::info!(
            "Crawl of {} completed: {} pages recorded in {:?}",
            self.target().netloc(),
            report.results.len(),
            start_time.elapsed()
        );

        Ok(report)
    }

    async fn load_policy(&self, mut session: CrawlSession) -> Result<CrawlSession, CrawlError> {
        session.advance(CrawlPhase::PolicyLoading)?;
        session.policy.load(&self.fetcher).await;
        Ok(session)
    }

    /// Appends every same-host `<loc>` of every declared sitemap
    ///
    /// Sitemap failures of any kind are logged and skipped.
    async fn seed_from_sitemaps(
        &self,
        mut session: CrawlSession,
    ) -> Result<CrawlSession, CrawlError> {
        session.advance(CrawlPhase::SitemapSeeding)?;

        let root = PagePath::root();
        let sitemaps = session.policy.sitemaps().to_vec();

        for location in sitemaps {
            let Some(sitemap) = normalize(&root, &location, self.target()) else {
                tracing::warn!("Sitemap {} is not on the crawl host, skipped", location);
                continue;
            };

            let xml = match self.fetcher.fetch_sitemap(&sitemap).await {
                Ok(FetchOutcome::Success(xml)) => xml,
                Ok(outcome) => {
                    tracing::warn!("Sitemap {} skipped: {}", sitemap, outcome);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Sitemap {} skipped: {}", sitemap, e);
                    continue;
                }
            };

            let mut seeded = 0;
            for loc in extract_sitemap_locations(&xml) {
                match normalize(&root, &loc, self.target()) {
                    Some(page) => {
                        session.frontier.push(page);
                        seeded += 1;
                    }
                    None => session.stats.cross_host_discarded += 1,
                }
            }

            tracing::info!("Seeded {} pages from sitemap {}", seeded, sitemap);
            session.stats.sitemap_entries += seeded;
        }

        Ok(session)
    }

    async fn crawl_frontier(&self, mut session: CrawlSession) -> Result<CrawlSession, CrawlError> {
        session.advance(CrawlPhase::Running)?;
        session.frontier.push(PagePath::root());

        let delay = self.politeness_delay(&session.policy);
        tracing::info!("Politeness delay: {:?}", delay);

        while !session.frontier.is_empty() {
            tokio::time::sleep(delay).await;

            let Some(page) = session.frontier.pop() else {
                break;
            };

            if session.is_visited(&page) {
                tracing::trace!("{} already visited", page);
                session.stats.duplicates_discarded += 1;
                continue;
            }

            if !session.policy.can_fetch(&self.agent, page.as_str()) {
                tracing::warn!("{} disallowed by robots.txt", page);
                session.stats.robots_denied += 1;
                continue;
            }

            self.visit(&mut session, page).await?;
        }

        tracing::info!("Frontier is empty, crawl complete");
        Ok(session)
    }

    /// Fetches one page, records its text and enqueues its links
    async fn visit(&self, session: &mut CrawlSession, page: PagePath) -> Result<(), CrawlError> {
        let outcome = self.fetcher.fetch(&page).await?;
        tracing::info!("{}: {}", page, outcome);
        session.stats.record_outcome(&outcome);

        let (fragments, links) = match outcome.into_text() {
            Some(html) => (extract_text(&html), extract_links(&html)),
            None => (Vec::new(), Vec::new()),
        };

        for href in &links {
            match normalize(&page, href, self.target()) {
                Some(next) => session.frontier.push(next),
                None => session.stats.cross_host_discarded += 1,
            }
        }

        session.record(page, fragments);

        tracing::debug!(
            "Found {} links, {} pages recorded, {} in frontier",
            links.len(),
            session.results().len(),
            session.frontier.len()
        );

        Ok(())
    }

    /// robots.txt Crawl-delay for our agent, else the configured fallback
    fn politeness_delay(&self, policy: &PolitenessGate) -> Duration {
        policy
            .crawl_delay(&self.agent)
            .unwrap_or(self.fallback_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UrlError;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.user_agent.crawler_name = "TestCrawler".to_string();
        config.crawler.politeness_delay = 0.5;
        config
    }

    #[test]
    fn test_crawler_creation() {
        let crawler = Crawler::new("http://localhost:8000/index.html", &create_test_config()).unwrap();
        assert_eq!(crawler.target().netloc(), "localhost:8000");
        assert_eq!(crawler.target().origin(), "http://localhost:8000");
    }

    #[test]
    fn test_crawler_rejects_invalid_root() {
        let result = Crawler::new("ftp://example.com/", &create_test_config());
        assert!(matches!(
            result,
            Err(CrawlError::Target(UrlError::InvalidScheme(_)))
        ));

        let result = Crawler::new("example.com", &create_test_config());
        assert!(matches!(result, Err(CrawlError::Target(UrlError::Parse(_)))));
    }

    #[test]
    fn test_politeness_delay_falls_back_to_config() {
        let crawler = Crawler::new("http://example.com", &create_test_config()).unwrap();

        let mut policy = PolitenessGate::default();
        policy.load_from(None);
        assert_eq!(crawler.politeness_delay(&policy), Duration::from_millis(500));
    }

    #[test]
    fn test_politeness_delay_prefers_robots() {
        let crawler = Crawler::new("http://example.com", &create_test_config()).unwrap();

        let mut policy = PolitenessGate::default();
        policy.load_from(Some(
            "User-agent: TestCrawler\nCrawl-delay: 3\n\nUser-agent: *\nCrawl-delay: 9",
        ));
        assert_eq!(crawler.politeness_delay(&policy), Duration::from_secs(3));

        let mut policy = PolitenessGate::default();
        policy.load_from(Some("User-agent: *\nCrawl-delay: 9"));
        assert_eq!(crawler.politeness_delay(&policy), Duration::from_secs(9));
    }

    #[test]
    fn test_unusable_delays_do_not_panic() {
        let mut config = create_test_config();
        config.crawler.politeness_delay = 1e300;
        let crawler = Crawler::new("http://example.com", &config).unwrap();

        let mut policy = PolitenessGate::default();
        policy.load_from(Some("User-agent: TestCrawler\nCrawl-delay: 1e30"));
        assert_eq!(crawler.politeness_delay(&policy), Duration::from_secs(1));
    }
}
