//! Run-scoped registry of URLs the crawler has already dealt with
//!
//! The registry keeps two sets behind one lock:
//! - *dispatched*: URLs handed to the fetch engine (or already captured as
//!   records in an earlier run). Frontier growth goes through
//!   [`SeenRegistry::check_and_insert`] on this set.
//! - *offered*: URLs already offered to the extraction service as link
//!   hints, each mapped to the page that offered it. A link is offered by
//!   at most one page per run; that page may offer it again on a retry.
//!
//! Both sets only grow. Keys are normalized with [`registry_key`].

use crate::url::registry_key;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct SeenSets {
    dispatched: HashSet<String>,
    offered: HashMap<String, String>,
}

/// Shared, synchronized set of URLs seen during one run
#[derive(Debug, Default)]
pub struct SeenRegistry {
    inner: Mutex<SeenSets>,
}

impl SeenRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with already-captured page URLs
    ///
    /// These URLs are treated as dispatched: they are never fetched again
    /// and never offered as link hints.
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dispatched = urls
            .into_iter()
            .map(|url| registry_key(url.as_ref()))
            .collect();
        Self {
            inner: Mutex::new(SeenSets {
                dispatched,
                offered: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SeenSets> {
        // The sets stay consistent even if a holder panicked mid-insert
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically tests whether `url` was dispatched and marks it dispatched
    ///
    /// Returns true only for the first caller with a given URL.
    pub fn check_and_insert(&self, url: &str) -> bool {
        self.lock().dispatched.insert(registry_key(url))
    }

    /// Atomically registers `url` as a link hint offered by `page`
    ///
    /// Returns false if the URL was already dispatched or was offered by a
    /// different page. The offering page itself gets true again.
    pub fn offer(&self, url: &str, page: &str) -> bool {
        let key = registry_key(url);
        let page_key = registry_key(page);
        let mut sets = self.lock();
        if sets.dispatched.contains(&key) {
            return false;
        }
        match sets.offered.get(&key) {
            Some(owner) => *owner == page_key,
            None => {
                sets.offered.insert(key, page_key);
                true
            }
        }
    }

    /// Number of dispatched URLs
    pub fn dispatched_len(&self) -> usize {
        self.lock().dispatched.len()
    }

    /// Number of URLs offered as link hints
    pub fn offered_len(&self) -> usize {
        self.lock().offered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_check_and_insert_first_wins() {
        let seen = SeenRegistry::new();
        assert!(seen.check_and_insert("http://example.com/a"));
        assert!(!seen.check_and_insert("http://example.com/a"));
        assert!(!seen.check_and_insert("http://EXAMPLE.com/a/#frag"));
        assert_eq!(seen.dispatched_len(), 1);
    }

    #[test]
    fn test_preseeded_urls_are_rejected() {
        let seen = SeenRegistry::with_urls(["http://example.com/old"]);
        assert!(!seen.check_and_insert("http://example.com/old"));
        assert!(!seen.offer("http://example.com/old", "http://example.com/a"));
        assert_eq!(seen.dispatched_len(), 1);
    }

    #[test]
    fn test_offer_once_across_pages() {
        let seen = SeenRegistry::new();
        assert!(seen.offer("http://example.com/b", "http://example.com/a"));
        assert!(!seen.offer("http://example.com/b", "http://example.com/c"));
        assert_eq!(seen.offered_len(), 1);
    }

    #[test]
    fn test_same_page_may_offer_again() {
        let seen = SeenRegistry::new();
        assert!(seen.offer("http://example.com/b", "http://example.com/a"));
        assert!(seen.offer("http://example.com/b", "http://EXAMPLE.com/a/"));
        assert_eq!(seen.offered_len(), 1);
    }

    #[test]
    fn test_offered_url_can_still_be_dispatched_once() {
        let seen = SeenRegistry::new();
        assert!(seen.offer("http://example.com/b", "http://example.com/a"));
        assert_eq!(seen.dispatched_len(), 0);

        assert!(seen.check_and_insert("http://example.com/b"));
        assert!(!seen.check_and_insert("http://example.com/b"));
        assert!(!seen.offer("http://example.com/b", "http://example.com/a"));
    }

    #[test]
    fn test_concurrent_check_and_insert_has_one_winner() {
        let seen = Arc::new(SeenRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || seen.check_and_insert("http://example.com/race"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
