//! Run statistics
//!
//! Counters collected by the coordinator over one run and reported when
//! the run finishes.

use crate::store::PersistSummary;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages handed to the fetch engine (first attempts only)
    pub pages_dispatched: u64,

    /// Pages fetched and run through extraction
    pub pages_completed: u64,

    /// Pages abandoned after the retry budget was spent
    pub pages_dropped: u64,

    /// Additional fetch attempts
    pub retries: u64,

    /// Records produced by extraction
    pub records_extracted: u64,

    /// Records accepted by the store
    pub records_stored: u64,

    /// Records written to the fallback cache
    pub records_cached: u64,

    /// Records neither stored nor cached
    pub records_lost: u64,

    /// URLs added to the frontier, seeds included
    pub urls_enqueued: u64,

    /// Related URLs discarded because the run was draining
    pub urls_discarded: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn record_persist(&mut self, summary: &PersistSummary) {
        self.records_stored += summary.stored as u64;
        self.records_cached += summary.cached as u64;
        self.records_lost += summary.lost as u64;
    }

    /// Fraction of dispatched pages that completed, as a percentage
    pub fn completion_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            return 0.0;
        }
        (self.pages_completed as f64 / self.pages_dispatched as f64) * 100.0
    }

    /// Writes the summary to the log
    pub fn log_summary(&self) {
        tracing::info!(
            "Pages: {} dispatched, {} completed ({:.1}%), {} dropped, {} retries",
            self.pages_dispatched,
            self.pages_completed,
            self.completion_rate(),
            self.pages_dropped,
            self.retries
        );
        tracing::info!(
            "Records: {} extracted, {} stored, {} cached locally",
            self.records_extracted,
            self.records_stored,
            self.records_cached
        );
        if self.records_lost > 0 {
            tracing::error!("{} records could not be stored or cached", self.records_lost);
        }
        tracing::info!(
            "URLs enqueued: {} ({} discarded while draining), elapsed {:.1}s",
            self.urls_enqueued,
            self.urls_discarded,
            self.elapsed.as_secs_f64()
        );
    }
}
