use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Sitesift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub extractor: ExtractorConfig,
}

/// Run-scoped storage location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Base directory for run storage and fallback cache files
    #[serde(default)]
    pub dir: PathBuf,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of page fetches per run; unbounded when absent
    #[serde(rename = "max-requests-per-crawl", default)]
    pub max_requests_per_crawl: Option<u64>,

    /// Per-request handling timeout (minutes)
    #[serde(
        rename = "request-timeout-minutes",
        default = "default_request_timeout_minutes"
    )]
    pub request_timeout_minutes: u64,

    /// Number of pages handled at the same time
    #[serde(rename = "max-concurrent-pages", default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: u32,

    /// When false, every page goes through the generic strategy
    #[serde(rename = "custom-extractors-enabled", default = "default_true")]
    pub custom_extractors_enabled: bool,

    /// User agent sent with page fetches
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_minutes.saturating_mul(60))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_requests_per_crawl: None,
            request_timeout_minutes: default_request_timeout_minutes(),
            max_concurrent_pages: default_max_concurrent_pages(),
            custom_extractors_enabled: true,
            user_agent: None,
        }
    }
}

/// Backend record store (PocketBase) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Login identity; anonymous mode when empty
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Collection holding the crawl targets
    #[serde(rename = "sites-collection", default = "default_sites_collection")]
    pub sites_collection: String,

    /// Collection receiving extracted records
    #[serde(rename = "records-collection", default = "default_records_collection")]
    pub records_collection: String,
}

impl StoreConfig {
    /// Returns true when no credentials are configured
    pub fn is_anonymous(&self) -> bool {
        self.email.is_empty() && self.password.is_empty()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            email: String::new(),
            password: String::new(),
            sites_collection: default_sites_collection(),
            records_collection: default_records_collection(),
        }
    }
}

/// Information-extraction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// URL the extraction requests are posted to
    pub endpoint: String,

    /// Bearer token for the service
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Upper bound for one extraction call (seconds)
    #[serde(rename = "timeout-seconds", default = "default_extractor_timeout")]
    pub timeout_seconds: u64,
}

fn default_request_timeout_minutes() -> u64 {
    5
}

fn default_max_concurrent_pages() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_sites_collection() -> String {
    "sites".to_string()
}

fn default_records_collection() -> String {
    "infos".to_string()
}

fn default_extractor_timeout() -> u64 {
    600
}
