//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the forward-only lifecycle of a crawl
//! - `CrawlSession`: frontier, results, robots policy and statistics of one run
//! - `CrawlReport`: what a finished session hands back

mod crawl_phase;
mod session;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use session::{CrawlReport, CrawlSession, Results};
