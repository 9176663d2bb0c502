//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests that follow redirects
//! - Content-Type checks so only HTML reaches extraction
//! - Error classification

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("sitesift/", env!("CARGO_PKG_VERSION"));

/// Maximum redirect hops before a fetch fails
const MAX_REDIRECTS: usize = 10;

/// Content types accepted as pages
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("not an HTML page (Content-Type: {content_type})")]
    ContentMismatch { content_type: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A fetched HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL the page was requested with
    pub request_url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// Page body
    pub html: String,
}

/// The fetch engine
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

    Client::builder()
        .user_agent(user_agent)
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher over a plain HTTP client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // A missing header is given the benefit of the doubt
        if !content_type.is_empty() && !is_html(&content_type) {
            return Err(FetchError::ContentMismatch { content_type });
        }

        let html = response.text().await?;

        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(FetchedPage {
            request_url: url.clone(),
            final_url,
            html,
        })
    }
}

fn is_html(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    HTML_CONTENT_TYPES.iter().any(|t| lowered.contains(t))
}
