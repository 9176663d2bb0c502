//! Custom extractor interface and the adapter that isolates plugin failures

use crate::extract::types::{Article, CustomOutput, DiscoveredLinks, InfoRecord, LinkCandidates};
use crate::FailureKind;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use url::Url;

/// Errors a custom extractor may report
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),

    #[error("extractor panicked: {0}")]
    Panicked(String),
}

/// A per-domain extractor with specialized parsing logic
#[async_trait]
pub trait CustomExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Extracts whatever this site offers from one page
    async fn extract(&self, html: &str, url: &Url) -> Result<CustomOutput, PluginError>;
}

/// What the pipeline should do after a custom extractor ran
#[derive(Debug, Clone, PartialEq)]
pub enum CustomPlan {
    /// The extractor already produced final records and/or frontier URLs
    Direct {
        records: Vec<InfoRecord>,
        related: BTreeSet<String>,
    },
    /// The article still needs the extraction service
    Extract {
        article: Article,
        hints: LinkCandidates,
    },
    /// Nothing usable; the page ends here with zero records
    Empty,
}

/// Runs a custom extractor and normalizes its output into a [`CustomPlan`]
///
/// Errors and panics raised by the extractor are contained: the page is
/// treated as having produced nothing and the run continues.
pub async fn invoke_custom(extractor: &dyn CustomExtractor, html: &str, url: &Url) -> CustomPlan {
    let output = match run_isolated(extractor, html, url).await {
        Ok(output) => {
            if output.is_empty() {
                tracing::warn!(
                    "{} was handled by custom extractor {} but produced nothing",
                    url,
                    extractor.name()
                );
            }
            output
        }
        Err(e) => {
            tracing::warn!(
                kind = ?FailureKind::Plugin,
                "Custom extractor {} failed on {}, no information found: {}",
                extractor.name(),
                url,
                e
            );
            CustomOutput::default()
        }
    };

    plan_from_output(output, url)
}

async fn run_isolated(
    extractor: &dyn CustomExtractor,
    html: &str,
    url: &Url,
) -> Result<CustomOutput, PluginError> {
    match AssertUnwindSafe(extractor.extract(html, url))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(PluginError::Panicked(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Decides the next step from a custom extractor's output
fn plan_from_output(output: CustomOutput, url: &Url) -> CustomPlan {
    let (hints, related) = match output.links {
        DiscoveredLinks::None => (LinkCandidates::new(), BTreeSet::new()),
        DiscoveredLinks::Hints(hints) => (hints, BTreeSet::new()),
        DiscoveredLinks::Frontier(urls) => (LinkCandidates::new(), urls),
    };

    if !output.records.is_empty() || !related.is_empty() {
        return CustomPlan::Direct {
            records: output.records,
            related,
        };
    }

    match output.article.filter(Article::has_content) {
        Some(article) => CustomPlan::Extract { article, hints },
        None => {
            tracing::warn!(
                "No content found in {} by custom extractor, skipping the extraction service",
                url
            );
            CustomPlan::Empty
        }
    }
}
