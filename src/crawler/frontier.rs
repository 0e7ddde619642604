//! Crawl frontier
//!
//! A strict FIFO of page paths waiting to be visited. Duplicates are accepted
//! on push; they are resolved when popped, against the recorded results.

use crate::url::PagePath;
use std::collections::VecDeque;

/// FIFO queue of page paths
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<PagePath>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page at the back of the queue
    pub fn push(&mut self, page: PagePath) {
        tracing::trace!("Enqueued {} ({} waiting)", page, self.queue.len() + 1);
        self.queue.push_back(page);
    }

    /// Takes the oldest page from the front of the queue
    pub fn pop(&mut self) -> Option<PagePath> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Extend<PagePath> for Frontier {
    fn extend<I: IntoIterator<Item = PagePath>>(&mut self, pages: I) {
        for page in pages {
            self.push(page);
        }
    }
}
