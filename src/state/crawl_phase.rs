/// Crawl phase definitions
///
/// A crawl only ever moves forward through these phases, one step at a time.
use std::fmt;

/// Represents the current phase of a crawl session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Session created, nothing fetched yet
    #[default]
    Idle,

    /// robots.txt is being fetched and parsed
    PolicyLoading,

    /// Declared sitemaps are being read into the frontier
    SitemapSeeding,

    /// The main wait / dequeue / fetch / enqueue loop
    Running,

    /// Frontier exhausted, results being handed over
    Draining,

    /// Terminal
    Done,
}

impl CrawlPhase {
    /// The only phase this one may advance to
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::PolicyLoading),
            Self::PolicyLoading => Some(Self::SitemapSeeding),
            Self::SitemapSeeding => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        self.successor() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PolicyLoading => "policy-loading",
            Self::SitemapSeeding => "sitemap-seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
