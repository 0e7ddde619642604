//! Robots.txt parser implementation
//!
//! Allow/Disallow evaluation is delegated to the robotstxt crate; Crawl-delay
//! and Sitemap directives, which that matcher does not expose, are read here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's types, providing a simplified
/// interface for checking paths plus access to the extension directives.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
    /// Sitemap locations, in file order
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A ParsedRobots instance that can be used to check path permissions
    pub fn from_content(content: &str) -> Self {
        let sitemaps = directives(content)
            .filter(|(key, _)| key == "sitemap")
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
            .collect();

        Self {
            content: content.to_string(),
            allow_all: false,
            sitemaps,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used as the default when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            sitemaps: Vec::new(),
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// The most specific (longest) matching rule wins; a path no rule matches
    /// is allowed.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to check (e.g., "/page.html?x=1")
    /// * `user_agent` - The user agent product token
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, path)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A delay declared in a group naming the agent wins over one declared in
    /// the `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(Duration)` - The declared crawl delay
    /// * `None` - If no usable crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let agent = product_token(user_agent);

        // Consecutive User-agent lines form one group
        let mut current_user_agents: Vec<String> = Vec::new();
        let mut reading_agents = false;
        let mut crawl_delay_for_wildcard: Option<Duration> = None;
        let mut crawl_delay_for_agent: Option<Duration> = None;

        for (key, value) in directives(&self.content) {
            match key.as_str() {
                "user-agent" => {
                    if !reading_agents {
                        current_user_agents.clear();
                    }
                    current_user_agents.push(value.to_lowercase());
                    reading_agents = true;
                }
                "crawl-delay" => {
                    reading_agents = false;

                    let delay = match value.parse::<f64>().map(Duration::try_from_secs_f64) {
                        Ok(Ok(delay)) => delay,
                        Ok(Err(_)) => {
                            tracing::warn!("Ignoring unusable Crawl-delay {}", value);
                            continue;
                        }
                        Err(_) => continue,
                    };

                    if current_user_agents.iter().any(|ua| *ua == agent) {
                        crawl_delay_for_agent.get_or_insert(delay);
                    } else if current_user_agents.iter().any(|ua| ua == "*") {
                        crawl_delay_for_wildcard.get_or_insert(delay);
                    }
                }
                _ => reading_agents = false,
            }
        }

        crawl_delay_for_agent.or(crawl_delay_for_wildcard)
    }

    /// Sitemap locations declared anywhere in the file
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// Lowercased product token of a user agent string (`Name/1.0 (...)` -> `name`)
fn product_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Iterates `key: value` lines with comments stripped and keys lowercased
fn directives(content: &str) -> impl Iterator<Item = (String, &str)> {
    content.lines().filter_map(|line| {
        let line = match line.split_once('#') {
            Some((before, _comment)) => before,
            None => line,
        };
        let (key, value) = line.trim().split_once(':')?;
        Some((key.trim().to_lowercase(), value.trim()))
    })
}
