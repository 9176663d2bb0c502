//! Sitesift: a site crawler that turns pages into structured records
//!
//! This crate crawls a configured set of web sites, routes every fetched page
//! to a per-domain extractor or a generic heuristic strategy, hands the page
//! text to an information-extraction service, and persists the resulting
//! records to a backend store with a local fallback cache.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod state;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Sitesift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes and how far each one is allowed to propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network/navigation error or timeout; retried once, then dropped
    Fetch,
    /// A custom extractor raised or panicked; the page yields nothing
    Plugin,
    /// The information-extraction call failed; the page yields nothing
    ExtractionService,
    /// The backend rejected a write; the record goes to the fallback cache
    StoreWrite,
    /// Unreadable or invalid settings at startup
    Configuration,
    /// The backend could not be reached, authenticated against or read,
    /// or local resources could not be set up before crawling
    Startup,
    /// State-machine problems
    Internal,
}

impl FailureKind {
    /// Returns true if this failure must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration | Self::Startup)
    }
}

impl SiftError {
    /// Classifies this error into the failure taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) => FailureKind::Configuration,
            // Per-page store writes never reach here
            Self::Store(_) | Self::HttpClient(_) | Self::Io(_) => FailureKind::Startup,
            Self::InvalidTransition { .. } => FailureKind::Internal,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Sitesift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlStatistics};
pub use state::{RunPhase, SeenRegistry};
pub use crate::url::{network_location, normalize_url, origin_of};
