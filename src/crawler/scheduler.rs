//! Frontier queue and request budget
//!
//! The scheduler owns the URLs waiting to be fetched and counts first
//! dispatches against the optional max-requests-per-crawl budget. Retries
//! of an already dispatched page do not consume budget.

use std::collections::VecDeque;
use url::Url;

/// FIFO frontier with a dispatch budget
#[derive(Debug, Default)]
pub struct Scheduler {
    /// URLs waiting to be dispatched, in enqueue order
    frontier: VecDeque<Url>,

    /// Maximum number of dispatches; unbounded when `None`
    max_requests: Option<u64>,

    /// Number of URLs handed out so far
    dispatched: u64,
}

impl Scheduler {
    /// Creates a scheduler with an optional request budget
    pub fn new(max_requests: Option<u64>) -> Self {
        Self {
            frontier: VecDeque::new(),
            max_requests,
            dispatched: 0,
        }
    }

    /// Appends a URL to the frontier
    ///
    /// Deduplication is the caller's job; the seen-URL registry decides
    /// what may be enqueued.
    pub fn enqueue(&mut self, url: Url) {
        self.frontier.push_back(url);
    }

    /// Takes the next URL to dispatch
    ///
    /// Returns `None` when the frontier is empty or the budget is spent.
    pub fn next_url(&mut self) -> Option<Url> {
        if self.is_exhausted() {
            return None;
        }
        let url = self.frontier.pop_front()?;
        self.dispatched += 1;
        Some(url)
    }

    /// Returns true if the request budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.max_requests
            .map_or(false, |max| self.dispatched >= max)
    }

    /// Discards every pending URL and returns how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.frontier.len();
        self.frontier.clear();
        dropped
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
