//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that coordinates one crawl:
//! - Seeding the frontier from the activated sites
//! - Dispatching pages to concurrent page tasks
//! - Per-request timeout and the single retry
//! - Persisting records and growing the frontier from related URLs
//! - Draining in-flight work once the budget or the frontier runs out

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::pipeline::{PageOutput, PagePipeline};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::stats::CrawlStatistics;
use crate::extract::resolve_href;
use crate::state::{RunPhase, SeenRegistry};
use crate::store::{PersistSummary, Persister, Site};
use crate::{FailureKind, SiftError};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};
use url::Url;

/// Additional attempts after a failed or timed-out fetch
const MAX_RETRIES: u32 = 1;

/// Everything a page task needs, shared by all tasks of a run
struct PageContext {
    fetcher: Arc<dyn PageFetcher>,
    pipeline: PagePipeline,
    persister: Persister,
    request_timeout: Duration,
}

/// Result of one page task
#[derive(Debug)]
struct PageReport {
    url: Url,
    retries: u32,
    outcome: Option<PageResult>,
}

#[derive(Debug)]
struct PageResult {
    records_extracted: usize,
    persisted: PersistSummary,
    related_urls: BTreeSet<String>,
}

/// Main crawler coordinator structure
///
/// The frontier and the run phase belong to the coordinator alone; page
/// tasks share only the seen-URL registry.
pub struct Coordinator {
    phase: RunPhase,
    scheduler: Scheduler,
    seen: Arc<SeenRegistry>,
    context: Arc<PageContext>,
    max_concurrent_pages: usize,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Crawler limits (request budget, timeout, concurrency)
    /// * `seen` - The run's seen-URL registry, already holding recorded URLs
    /// * `fetcher` - The fetch engine
    /// * `pipeline` - Route and extract logic for fetched pages
    /// * `persister` - Record persistence with fallback
    pub fn new(
        config: &CrawlerConfig,
        seen: Arc<SeenRegistry>,
        fetcher: Arc<dyn PageFetcher>,
        pipeline: PagePipeline,
        persister: Persister,
    ) -> Self {
        Self {
            phase: RunPhase::Idle,
            scheduler: Scheduler::new(config.max_requests_per_crawl),
            seen,
            context: Arc::new(PageContext {
                fetcher,
                pipeline,
                persister,
                request_timeout: config.request_timeout(),
            }),
            max_concurrent_pages: config.max_concurrent_pages.max(1) as usize,
            stats: CrawlStatistics::default(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs one crawl over the given sites to completion
    ///
    /// Per-page failures never end the run; an error here means the
    /// coordinator itself reached an inconsistent state.
    pub async fn run(mut self, sites: &[Site]) -> Result<CrawlStatistics, SiftError> {
        let start_time = Instant::now();

        self.transition(RunPhase::Seeding)?;
        self.seed(sites);

        self.transition(RunPhase::Running)?;
        let mut tasks: JoinSet<PageReport> = JoinSet::new();

        loop {
            if self.phase == RunPhase::Running {
                self.dispatch(&mut tasks);

                if self.scheduler.is_exhausted() {
                    tracing::info!("Max requests per crawl reached");
                    self.transition(RunPhase::Draining)?;
                } else if tasks.is_empty() && self.scheduler.is_empty() {
                    tracing::info!("Frontier is empty");
                    self.transition(RunPhase::Draining)?;
                }

                if self.phase == RunPhase::Draining {
                    let pending = self.scheduler.clear();
                    if pending > 0 {
                        tracing::info!("Discarding {} queued URLs", pending);
                    }
                }
            }

            match tasks.join_next().await {
                Some(joined) => self.absorb(joined),
                None => break,
            }
        }

        self.transition(RunPhase::Done)?;

        self.stats.elapsed = start_time.elapsed();
        self.stats.log_summary();
        Ok(self.stats)
    }

    fn transition(&mut self, to: RunPhase) -> Result<(), SiftError> {
        if !self.phase.can_transition_to(to) {
            return Err(SiftError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::info!("Crawl phase: {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Enqueues each site's root URL, skipping URLs already recorded
    fn seed(&mut self, sites: &[Site]) {
        for site in sites {
            let root = site.url.trim().trim_end_matches('/');
            match Url::parse(root) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    if !self.enqueue(url) {
                        tracing::debug!("Seed {} already recorded, skipping", root);
                    }
                }
                Ok(url) => tracing::warn!("Skipping site with unsupported scheme: {}", url),
                Err(e) => tracing::warn!("Skipping site with invalid URL {:?}: {}", site.url, e),
            }
        }
        tracing::info!(
            "Seeded {} of {} sites",
            self.scheduler.frontier_size(),
            sites.len()
        );
    }

    /// Adds a URL to the frontier if no other path got there first
    fn enqueue(&mut self, url: Url) -> bool {
        if !self.phase.accepts_requests() {
            self.stats.urls_discarded += 1;
            return false;
        }
        if !self.seen.check_and_insert(url.as_str()) {
            return false;
        }
        self.scheduler.enqueue(url);
        self.stats.urls_enqueued += 1;
        true
    }

    fn dispatch(&mut self, tasks: &mut JoinSet<PageReport>) {
        while tasks.len() < self.max_concurrent_pages {
            let Some(url) = self.scheduler.next_url() else {
                break;
            };
            self.stats.pages_dispatched += 1;
            tasks.spawn(process_page(Arc::clone(&self.context), url));
        }
    }

    fn absorb(&mut self, joined: Result<PageReport, JoinError>) {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Page task failed: {}", e);
                self.stats.pages_dropped += 1;
                return;
            }
        };

        self.stats.retries += report.retries as u64;

        let Some(result) = report.outcome else {
            self.stats.pages_dropped += 1;
            return;
        };

        self.stats.pages_completed += 1;
        self.stats.records_extracted += result.records_extracted as u64;
        self.stats.record_persist(&result.persisted);

        let mut added = 0usize;
        for related in &result.related_urls {
            let Some(resolved) = resolve_href(related, &report.url) else {
                tracing::debug!("Ignoring related URL {:?} from {}", related, report.url);
                continue;
            };
            let Ok(url) = Url::parse(&resolved) else {
                continue;
            };
            if self.enqueue(url) {
                added += 1;
            }
        }

        tracing::info!(
            "Finished {}: {} records, {} new URLs ({} in frontier)",
            report.url,
            result.records_extracted,
            added,
            self.scheduler.frontier_size()
        );
    }
}

/// Fetches, extracts and persists one page
///
/// The timeout covers fetch and extraction of one attempt; persistence
/// runs once, after a successful attempt.
async fn process_page(context: Arc<PageContext>, url: Url) -> PageReport {
    let mut retries = 0;
    let mut output = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            retries += 1;
            tracing::info!("Retrying {} (attempt {})", url, attempt + 1);
        }

        match tokio::time::timeout(context.request_timeout, fetch_and_extract(&context, &url)).await
        {
            Ok(Ok(page_output)) => {
                output = Some(page_output);
                break;
            }
            Ok(Err(e)) => {
                tracing::warn!(kind = ?FailureKind::Fetch, "Failed to fetch {}: {}", url, e)
            }
            Err(_) => tracing::warn!(
                kind = ?FailureKind::Fetch,
                "Failed to fetch {}: {}",
                url,
                FetchError::Timeout(context.request_timeout)
            ),
        }
    }

    let Some(output) = output else {
        tracing::warn!("Dropping {} after {} attempts", url, retries + 1);
        return PageReport {
            url,
            retries,
            outcome: None,
        };
    };

    let records_extracted = output.records.len();
    let persisted = context.persister.persist(url.as_str(), output.records).await;

    PageReport {
        url,
        retries,
        outcome: Some(PageResult {
            records_extracted,
            persisted,
            related_urls: output.related_urls,
        }),
    }
}

async fn fetch_and_extract(context: &PageContext, url: &Url) -> Result<PageOutput, FetchError> {
    tracing::info!("Navigating to {} ...", url);
    let page = context.fetcher.fetch(url).await?;
    Ok(context.pipeline.run(&page).await)
}
