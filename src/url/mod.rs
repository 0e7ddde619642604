//! URL handling module for Tidemark
//!
//! This module provides the crawl target, the normalized page path used as
//! page identity, and href normalization relative to the current page.

mod normalize;
mod target;

use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

// Re-export main functions
pub use normalize::{normalize, remove_dot_segments, Reference};
pub use target::Target;

/// A normalized, host-relative page path
///
/// Always starts with exactly one `/`. The query string is part of the
/// identity (`/a?x=1` and `/a?x=2` are distinct pages); the fragment never is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PagePath(String);

impl PagePath {
    /// The root page `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Builds a page path from an already resolved path and optional query
    ///
    /// Leading slashes collapse to one and an empty query is dropped, so the
    /// result re-normalizes to itself.
    pub fn from_parts(path: &str, query: Option<&str>) -> Self {
        let mut value = String::with_capacity(path.len() + 1);
        value.push('/');
        value.push_str(path.trim_start_matches('/'));

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            value.push('?');
            value.push_str(query);
        }

        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path component, without the query
    pub fn path(&self) -> &str {
        match self.0.split_once('?') {
            Some((path, _)) => path,
            None => &self.0,
        }
    }

    /// The query component, if any
    pub fn query(&self) -> Option<&str> {
        self.0.split_once('?').map(|(_, query)| query)
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PagePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PagePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
