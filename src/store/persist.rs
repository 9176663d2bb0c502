//! Record persistence with fallback
//!
//! Each record is tagged with its source page and written to the records
//! collection. A rejected write is logged and the record lands in the local
//! fallback cache instead; nothing here ever fails the page.

use crate::extract::InfoRecord;
use crate::store::fallback::FallbackCache;
use crate::store::traits::RecordStore;
use crate::FailureKind;
use std::sync::Arc;

/// How the records of one page were persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Accepted by the backend store
    pub stored: usize,
    /// Rejected by the store and written to the fallback cache
    pub cached: usize,
    /// Rejected by the store and the fallback write failed too
    pub lost: usize,
}

impl PersistSummary {
    pub fn total(&self) -> usize {
        self.stored + self.cached + self.lost
    }
}

/// Writes extracted records to the store, caching on failure
#[derive(Clone)]
pub struct Persister {
    store: Arc<dyn RecordStore>,
    collection: String,
    cache: FallbackCache,
}

impl Persister {
    pub fn new(
        store: Arc<dyn RecordStore>,
        collection: impl Into<String>,
        cache: FallbackCache,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            cache,
        }
    }

    pub fn cache(&self) -> &FallbackCache {
        &self.cache
    }

    /// Persists every record of one page
    ///
    /// # Arguments
    ///
    /// * `page_url` - The request URL of the page, stored in each record's `url` field
    /// * `records` - Records produced by extraction
    pub async fn persist(&self, page_url: &str, records: Vec<InfoRecord>) -> PersistSummary {
        let mut summary = PersistSummary::default();

        for record in records {
            let record = record.with_source_url(page_url);

            match self.store.create(&self.collection, record.fields()).await {
                Ok(id) => {
                    tracing::debug!("Stored record {} from {}", id, page_url);
                    summary.stored += 1;
                }
                Err(e) => {
                    tracing::error!(
                        kind = ?FailureKind::StoreWrite,
                        "Failed to store record from {}: {}; writing to fallback cache",
                        page_url,
                        e
                    );
                    match self.cache.write(&record) {
                        Ok(path) => {
                            tracing::info!("Cached record at {}", path.display());
                            summary.cached += 1;
                        }
                        Err(io) => {
                            tracing::error!("Fallback cache write failed, record lost: {}", io);
                            summary.lost += 1;
                        }
                    }
                }
            }
        }

        summary
    }
}
