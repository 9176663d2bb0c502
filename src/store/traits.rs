//! Record store trait and error types

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status} on {operation}: {body}")]
    Status {
        status: u16,
        operation: String,
        body: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Options for listing a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Store-side filter expression, e.g. `activated=true`
    pub filter: Option<String>,

    /// Fields to return; all fields when empty
    pub fields: Vec<String>,
}

impl ListQuery {
    pub fn filtered(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            fields: Vec::new(),
        }
    }

    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filter: None,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Backend record store
///
/// Implementations must be shareable across concurrently running page
/// pipelines.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads every item of a collection matching the query
    async fn list(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> StoreResult<Vec<Map<String, Value>>>;

    /// Creates one item and returns its id
    async fn create(&self, collection: &str, body: &Map<String, Value>) -> StoreResult<String>;
}
