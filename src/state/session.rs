//! Crawl session
//!
//! The session owns everything a crawl mutates. The coordinator moves it by
//! value from phase to phase and finally turns it into a [`CrawlReport`].

use crate::crawler::Frontier;
use crate::output::CrawlStatistics;
use crate::robots::PolitenessGate;
use crate::state::CrawlPhase;
use crate::url::PagePath;
use crate::CrawlError;
use std::collections::BTreeMap;

/// Page path to the text fragments extracted from it
///
/// Membership means "visited". Failed fetches are present with no fragments.
pub type Results = BTreeMap<PagePath, Vec<String>>;

/// Mutable state of one crawl
#[derive(Debug, Default)]
pub struct CrawlSession {
    phase: CrawlPhase,
    pub frontier: Frontier,
    results: Results,
    pub policy: PolitenessGate,
    pub stats: CrawlStatistics,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves the session to `next`
    ///
    /// Only the single forward step from the current phase is accepted.
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    pub fn is_visited(&self, page: &PagePath) -> bool {
        self.results.contains_key(page)
    }

    /// Records the fragments of a visited page
    ///
    /// Returns `false` and leaves the results untouched when the page was
    /// already recorded.
    pub fn record(&mut self, page: PagePath, fragments: Vec<String>) -> bool {
        if self.is_visited(&page) {
            return false;
        }

        self.results.insert(page, fragments);
        self.stats.pages_recorded += 1;
        true
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Drains the session into its final report
    ///
    /// Must be called in the `Running` phase; passes through `Draining` and
    /// ends in `Done`.
    pub fn finish(mut self) -> Result<CrawlReport, CrawlError> {
        self.advance(CrawlPhase::Draining)?;

        let pending = self.frontier.len();
        if pending > 0 {
            tracing::warn!("{} pages left in the frontier", pending);
        }

        self.advance(CrawlPhase::Done)?;

        Ok(CrawlReport {
            results: self.results,
            statistics: self.stats,
            pending,
        })
    }
}

/// Outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub results: Results,
    pub statistics: CrawlStatistics,
    /// Frontier length at the end of the run
    pub pending: usize,
}
