//! Extraction invocation: the call boundary to the information-extraction service
//!
//! The service receives page text, link candidates, the base URL and the
//! author/date hints, and answers with structured records, related URLs and
//! possibly corrected author/date values. It is slow and may fail; callers
//! use [`invoke_extraction`], which downgrades any failure to an empty
//! outcome.

use crate::config::ExtractorConfig;
use crate::extract::types::{InfoRecord, LinkCandidates};
use crate::FailureKind;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the extraction service call
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Inputs for one extraction call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionRequest {
    pub text: String,
    pub link_candidates: LinkCandidates,
    pub base_url: String,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
}

/// Result of one extraction call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractionOutcome {
    #[serde(default)]
    pub records: Vec<InfoRecord>,

    #[serde(default)]
    pub related_urls: BTreeSet<String>,

    /// Author as derived by the service from the text itself
    #[serde(default)]
    pub author: Option<String>,

    /// Publish date as derived by the service from the text itself
    #[serde(default)]
    pub publish_date: Option<String>,
}

/// The information-extraction service
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractionError>;
}

/// Calls the extraction service, containing any failure
///
/// A failed call is logged and yields zero records and zero related URLs.
pub async fn invoke_extraction(
    extractor: &dyn InfoExtractor,
    request: &ExtractionRequest,
    page_url: &str,
) -> ExtractionOutcome {
    match extractor.extract(request).await {
        Ok(outcome) => {
            if outcome.author != request.author || outcome.publish_date.is_some() {
                tracing::debug!(
                    "Extraction service corrected hints for {}: author={:?}, publish_date={:?}",
                    page_url,
                    outcome.author,
                    outcome.publish_date
                );
            }
            outcome
        }
        Err(e) => {
            tracing::warn!(
                kind = ?FailureKind::ExtractionService,
                "Extraction service failed for {}: {}",
                page_url,
                e
            );
            ExtractionOutcome::default()
        }
    }
}

/// HTTP client for an extraction service speaking JSON
///
/// `POST <endpoint>` with an [`ExtractionRequest`] body; the response body is
/// an [`ExtractionOutcome`].
pub struct ServiceExtractor {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ServiceExtractor {
    /// Builds the client from configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl InfoExtractor for ServiceExtractor {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: String) -> ExtractorConfig {
        ExtractorConfig {
            endpoint,
            api_key: Some("token-123".to_string()),
            timeout_seconds: 5,
        }
    }

    fn request() -> ExtractionRequest {
        let mut link_candidates = LinkCandidates::new();
        link_candidates.insert("Next".to_string(), "http://example.com/b".to_string());
        ExtractionRequest {
            text: "Hello world".to_string(),
            link_candidates,
            base_url: "http://example.com".to_string(),
            author: None,
            publish_date: NaiveDate::from_ymd_opt(2024, 1, 5),
        }
    }

    #[test]
    fn test_request_wire_format() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "Hello world",
                "link_candidates": {"Next": "http://example.com/b"},
                "base_url": "http://example.com",
                "author": null,
                "publish_date": "2024-01-05"
            })
        );
    }

    #[test]
    fn test_outcome_fields_default() {
        let outcome: ExtractionOutcome = serde_json::from_str("{}").unwrap();
        assert_eq!(outcome, ExtractionOutcome::default());
    }

    #[tokio::test]
    async fn test_successful_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_partial_json(json!({"text": "Hello world"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"content": "a fact", "tag": "news"}],
                "related_urls": ["http://example.com/b"],
                "author": "Jane"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let extractor = ServiceExtractor::new(&config(format!("{}/extract", server.uri()))).unwrap();
        let outcome = extractor.extract(&request()).await.unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].get("tag"), Some(&json!("news")));
        assert!(outcome.related_urls.contains("http://example.com/b"));
        assert_eq!(outcome.author.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let extractor = ServiceExtractor::new(&config(server.uri())).unwrap();
        let result = extractor.extract(&request()).await;
        assert!(matches!(
            result,
            Err(ExtractionError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let extractor = ServiceExtractor::new(&config(server.uri())).unwrap();
        let result = extractor.extract(&request()).await;
        assert!(matches!(result, Err(ExtractionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_invoke_contains_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let extractor = ServiceExtractor::new(&config(server.uri())).unwrap();
        let outcome = invoke_extraction(&extractor, &request(), "http://example.com/a").await;
        assert_eq!(outcome, ExtractionOutcome::default());
    }
}
