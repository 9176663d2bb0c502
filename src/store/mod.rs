//! Backend record store
//!
//! This module covers everything the crawler reads from or writes to the
//! store:
//! - The [`RecordStore`] trait and its PocketBase implementation
//! - Reading activated sites and already-recorded URLs at startup
//! - Persisting extracted records, with a local JSON fallback cache

mod fallback;
mod persist;
mod pocketbase;
mod traits;

pub use fallback::{FallbackCache, CACHE_SUFFIX};
pub use persist::{PersistSummary, Persister};
pub use pocketbase::PocketBaseStore;
pub use traits::{ListQuery, RecordStore, StoreError, StoreResult};

use crate::extract::SOURCE_URL_FIELD;
use serde::Deserialize;
use serde_json::Value;

/// A crawl target configured in the sites collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Site {
    pub url: String,

    #[serde(default)]
    pub activated: bool,
}

/// Reads the activated sites from the sites collection
///
/// Items that are not valid site entries are skipped with a warning.
pub async fn read_activated_sites(
    store: &dyn RecordStore,
    collection: &str,
) -> StoreResult<Vec<Site>> {
    let items = store
        .list(collection, &ListQuery::filtered("activated=true"))
        .await?;

    let mut sites = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Site>(Value::Object(item)) {
            Ok(site) if site.activated => sites.push(site),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping malformed site entry: {}", e),
        }
    }

    Ok(sites)
}

/// Reads the source URL of every record already in the records collection
pub async fn read_recorded_urls(
    store: &dyn RecordStore,
    collection: &str,
) -> StoreResult<Vec<String>> {
    let items = store
        .list(collection, &ListQuery::fields([SOURCE_URL_FIELD]))
        .await?;

    Ok(items
        .iter()
        .filter_map(|item| item.get(SOURCE_URL_FIELD).and_then(Value::as_str))
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_read_activated_sites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/sites/records"))
            .and(query_param("filter", "activated=true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "1", "url": "https://a.example/", "activated": true},
                    {"id": "2", "activated": true},
                    {"id": "3", "url": "https://c.example", "activated": false}
                ]
            })))
            .mount(&server)
            .await;

        let store = PocketBaseStore::new(&server.uri()).unwrap();
        let sites = read_activated_sites(&store, "sites").await.unwrap();
        assert_eq!(
            sites,
            vec![Site {
                url: "https://a.example/".to_string(),
                activated: true
            }]
        );
    }

    #[tokio::test]
    async fn test_read_recorded_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/infos/records"))
            .and(query_param("fields", "url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"url": "http://example.com/a"},
                    {"url": ""},
                    {"other": 1},
                    {"url": "http://example.com/b"}
                ]
            })))
            .mount(&server)
            .await;

        let store = PocketBaseStore::new(&server.uri()).unwrap();
        let urls = read_recorded_urls(&store, "infos").await.unwrap();
        assert_eq!(urls, vec!["http://example.com/a", "http://example.com/b"]);
    }

    #[tokio::test]
    async fn test_store_unreachable_is_an_error() {
        let store = PocketBaseStore::new("http://127.0.0.1:9").unwrap();
        assert!(read_recorded_urls(&store, "infos").await.is_err());
    }
}
