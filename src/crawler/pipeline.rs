//! Per-page extraction pipeline
//!
//! Route → (custom extractor | generic strategy) → extraction service.
//! Persistence and frontier growth happen in the coordinator once this
//! returns, so a timed-out attempt never leaves half-written records.

use crate::crawler::fetcher::FetchedPage;
use crate::extract::{
    extract_generic, invoke_custom, invoke_extraction, CustomExtractor, CustomPlan,
    ExtractionRequest, InfoExtractor, InfoRecord, Route, SiteRouter,
};
use crate::state::SeenRegistry;
use std::collections::BTreeSet;
use std::sync::Arc;

/// What one page produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutput {
    pub records: Vec<InfoRecord>,

    /// URLs proposed for the frontier, not yet deduplicated
    pub related_urls: BTreeSet<String>,
}

/// Wires the router, the extractors and the extraction service together
pub struct PagePipeline {
    router: SiteRouter,
    extractor: Arc<dyn InfoExtractor>,
    seen: Arc<SeenRegistry>,
}

impl PagePipeline {
    pub fn new(router: SiteRouter, extractor: Arc<dyn InfoExtractor>, seen: Arc<SeenRegistry>) -> Self {
        Self {
            router,
            extractor,
            seen,
        }
    }

    /// Extracts records and related URLs from a fetched page
    ///
    /// Never fails: plugin and extraction-service failures are contained
    /// and degrade to an empty output.
    pub async fn run(&self, page: &FetchedPage) -> PageOutput {
        match self.router.route_url(&page.request_url) {
            Route::Custom(extractor) => self.run_custom(extractor.as_ref(), page).await,
            Route::Generic => self.run_generic(page).await,
        }
    }

    async fn run_generic(&self, page: &FetchedPage) -> PageOutput {
        let generic = extract_generic(&page.html, &page.request_url, &self.seen);
        tracing::debug!(
            "Generic extraction for {}: {} chars, {} link candidates",
            page.request_url,
            generic.text.len(),
            generic.link_candidates.len()
        );

        let request = ExtractionRequest {
            text: generic.text,
            link_candidates: generic.link_candidates,
            base_url: generic.base_url,
            author: generic.author,
            publish_date: generic.publish_date,
        };
        self.call_service(&request, page).await
    }

    async fn run_custom(&self, extractor: &dyn CustomExtractor, page: &FetchedPage) -> PageOutput {
        tracing::debug!("Routing {} to custom extractor {}", page.request_url, extractor.name());

        match invoke_custom(extractor, &page.html, &page.request_url).await {
            CustomPlan::Direct { records, related } => PageOutput {
                records,
                related_urls: related,
            },
            CustomPlan::Extract { article, hints } => {
                let request = ExtractionRequest {
                    text: article.content,
                    link_candidates: hints,
                    base_url: page.request_url.to_string(),
                    author: article.author,
                    publish_date: article.publish_date,
                };
                self.call_service(&request, page).await
            }
            CustomPlan::Empty => PageOutput::default(),
        }
    }

    async fn call_service(&self, request: &ExtractionRequest, page: &FetchedPage) -> PageOutput {
        let outcome =
            invoke_extraction(self.extractor.as_ref(), request, page.request_url.as_str()).await;
        PageOutput {
            records: outcome.records,
            related_urls: outcome.related_urls,
        }
    }
}
