//! Crawler module for page fetching and orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - The frontier queue and request budget
//! - The per-page extraction pipeline
//! - Overall crawl coordination and run statistics

mod coordinator;
mod fetcher;
mod pipeline;
mod scheduler;
mod stats;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher, DEFAULT_USER_AGENT,
};
pub use pipeline::{PageOutput, PagePipeline};
pub use scheduler::Scheduler;
pub use stats::CrawlStatistics;

use crate::config::Config;
use crate::extract::{ServiceExtractor, SiteRouter};
use crate::state::SeenRegistry;
use crate::store::{
    read_activated_sites, read_recorded_urls, FallbackCache, Persister, PocketBaseStore, RecordStore,
};
use crate::SiftError;
use std::sync::Arc;

/// Runs one complete crawl over all activated sites
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the project directory
/// 2. Connect to the backend store
/// 3. Pre-populate the seen-URL registry with already recorded page URLs
/// 4. Read the activated sites
/// 5. Build the fetcher, the extraction service client and the site router
/// 6. Run the coordinator to completion
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed
/// * `Err(SiftError)` - Startup failed
pub async fn crawl(config: Config) -> Result<CrawlStatistics, SiftError> {
    std::fs::create_dir_all(&config.project.dir)?;

    let store: Arc<dyn RecordStore> = Arc::new(PocketBaseStore::connect(&config.store).await?);

    let recorded = read_recorded_urls(store.as_ref(), &config.store.records_collection).await?;
    tracing::info!("Loaded {} previously recorded URLs", recorded.len());
    let seen = Arc::new(SeenRegistry::with_urls(&recorded));

    let sites = read_activated_sites(store.as_ref(), &config.store.sites_collection).await?;
    if sites.is_empty() {
        tracing::warn!("No activated sites found in {}", config.store.sites_collection);
    } else {
        tracing::info!("Found {} activated sites", sites.len());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let extractor = Arc::new(ServiceExtractor::new(&config.extractor)?);

    let router = SiteRouter::with_builtin(config.crawler.custom_extractors_enabled);
    if router.is_enabled() {
        tracing::info!("Custom extractors registered for: {}", router.domains().join(", "));
    } else {
        tracing::info!("Custom extractors disabled, all pages use generic extraction");
    }

    let pipeline = PagePipeline::new(router, extractor, Arc::clone(&seen));
    let persister = Persister::new(
        store,
        config.store.records_collection.clone(),
        FallbackCache::new(&config.project.dir),
    );

    Coordinator::new(&config.crawler, seen, fetcher, pipeline, persister)
        .run(&sites)
        .await
}

