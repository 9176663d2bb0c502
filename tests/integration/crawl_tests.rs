//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the crawled site, the
//! PocketBase store and the extraction service, and run full crawls
//! end-to-end.

use async_trait::async_trait;
use serde_json::{json, Value};
use sitesift::config::{Config, CrawlerConfig, ExtractorConfig, ProjectConfig, StoreConfig};
use sitesift::crawler::{crawl, Coordinator, HttpFetcher, PagePipeline};
use sitesift::extract::{CustomExtractor, CustomOutput, PluginError, ServiceExtractor, SiteRouter};
use sitesift::store::{FallbackCache, Persister, PocketBaseStore, Site};
use sitesift::{network_location, SeenRegistry};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITES: &str = "/api/collections/sites/records";
const INFOS: &str = "/api/collections/infos/records";

/// Creates a test configuration pointing at the mock servers
fn create_test_config(dir: &Path, store: &MockServer, extractor: &MockServer) -> Config {
    Config {
        project: ProjectConfig {
            dir: dir.to_path_buf(),
        },
        crawler: CrawlerConfig {
            max_concurrent_pages: 1,
            ..CrawlerConfig::default()
        },
        store: StoreConfig {
            api_base: store.uri(),
            ..StoreConfig::default()
        },
        extractor: ExtractorConfig {
            endpoint: format!("{}/extract", extractor.uri()),
            api_key: None,
            timeout_seconds: 5,
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
}

/// Mounts the site list and the recorded-URL list of an anonymous store
async fn mount_store(store: &MockServer, sites: &[String], recorded: &[String]) {
    let sites: Vec<Value> = sites
        .iter()
        .map(|url| json!({"url": url, "activated": true}))
        .collect();
    let recorded: Vec<Value> = recorded.iter().map(|url| json!({ "url": url })).collect();

    Mock::given(method("GET"))
        .and(path(SITES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": sites })))
        .mount(store)
        .await;
    Mock::given(method("GET"))
        .and(path(INFOS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": recorded })))
        .mount(store)
        .await;
}

/// Extraction service that finds nothing unless a more specific mock matches
async fn mount_empty_extraction(extractor: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .with_priority(10)
        .mount(extractor)
        .await;
}

async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

fn cache_files(dir: &Path) -> Vec<std::path::PathBuf> {
    FallbackCache::new(dir).entries().unwrap()
}

#[tokio::test]
async fn test_generic_page_is_extracted_persisted_and_followed() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<p>Hello world</p><a href="/b">Next</a>"#))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>Second page</p>"))
        .expect(1)
        .mount(&site)
        .await;

    mount_store(&store, &[format!("{}/a", base)], &[]).await;
    Mock::given(method("POST"))
        .and(path(INFOS))
        .and(body_partial_json(json!({"content": "fact", "url": format!("{}/a", base)})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "rec1"})))
        .expect(1)
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(json!({
            "link_candidates": {"Next": format!("{}/b", base)},
            "base_url": base,
            "author": null,
            "publish_date": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"content": "fact"}],
            "related_urls": [format!("{}/b", base)]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&extractor)
        .await;
    mount_empty_extraction(&extractor).await;

    let config = create_test_config(dir.path(), &store, &extractor);
    let stats = crawl(config).await.unwrap();

    assert_eq!(stats.pages_completed, 2);
    assert_eq!(stats.records_extracted, 1);
    assert_eq!(stats.records_stored, 1);
    assert_eq!(stats.urls_enqueued, 2);
    assert!(cache_files(dir.path()).is_empty());

    let texts: Vec<String> = extractor
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|body| body["text"].as_str().map(str::to_string))
        .collect();
    assert!(texts.iter().any(|text| text.starts_with("Hello world")));
}

#[tokio::test]
async fn test_max_requests_limits_fetches() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html("<p>page</p>"))
        .mount(&site)
        .await;
    mount_store(
        &store,
        &[format!("{}/one", site.uri()), format!("{}/two", site.uri())],
        &[],
    )
    .await;
    mount_empty_extraction(&extractor).await;

    let mut config = create_test_config(dir.path(), &store, &extractor);
    config.crawler.max_requests_per_crawl = Some(1);
    config.crawler.max_concurrent_pages = 4;

    let stats = crawl(config).await.unwrap();

    assert_eq!(site.received_requests().await.unwrap().len(), 1);
    assert_eq!(stats.pages_dispatched, 1);
    assert_eq!(stats.pages_completed, 1);
}

#[tokio::test]
async fn test_recorded_urls_are_never_enqueued() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let recorded = format!("{}/a", site.uri());
    // Trailing slash on the site entry is stripped before the seen check
    mount_store(&store, &[format!("{}/", recorded)], &[recorded]).await;
    mount_empty_extraction(&extractor).await;

    let stats = crawl(create_test_config(dir.path(), &store, &extractor))
        .await
        .unwrap();

    assert!(site.received_requests().await.unwrap().is_empty());
    assert_eq!(stats.pages_dispatched, 0);
    assert_eq!(stats.urls_enqueued, 0);
}

#[tokio::test]
async fn test_store_failure_writes_one_cache_file_and_run_continues() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(html("<p>first page</p>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(html("<p>second page</p>"))
        .expect(1)
        .mount(&site)
        .await;

    mount_store(&store, &[format!("{}/first", base), format!("{}/second", base)], &[]).await;
    Mock::given(method("POST"))
        .and(path(INFOS))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(json!({"text": "first page"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"content": "only fact", "tags": ["x"]}]
        })))
        .with_priority(1)
        .mount(&extractor)
        .await;
    mount_empty_extraction(&extractor).await;

    let stats = crawl(create_test_config(dir.path(), &store, &extractor))
        .await
        .unwrap();

    assert_eq!(stats.pages_completed, 2);
    assert_eq!(stats.records_cached, 1);
    assert_eq!(stats.records_stored, 0);

    let files = cache_files(dir.path());
    assert_eq!(files.len(), 1);
    let cached: Value = serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(
        cached,
        json!({"content": "only fact", "tags": ["x"], "url": format!("{}/first", base)})
    );
}

#[tokio::test]
async fn test_failed_fetch_is_retried_once() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>recovered</p>"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    mount_store(
        &store,
        &[format!("{}/flaky", site.uri()), format!("{}/down", site.uri())],
        &[],
    )
    .await;
    mount_empty_extraction(&extractor).await;

    let stats = crawl(create_test_config(dir.path(), &store, &extractor))
        .await
        .unwrap();

    assert_eq!(requests_to(&site, "/flaky").await, 2);
    assert_eq!(requests_to(&site, "/down").await, 2);
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.pages_completed, 1);
    assert_eq!(stats.pages_dropped, 1);
}

#[tokio::test]
async fn test_extraction_service_failure_is_contained() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html(r#"<p>text</p><a href="/next">Next</a>"#))
        .mount(&site)
        .await;
    mount_store(&store, &[format!("{}/start", site.uri())], &[]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&extractor)
        .await;

    let stats = crawl(create_test_config(dir.path(), &store, &extractor))
        .await
        .unwrap();

    assert_eq!(stats.pages_completed, 1);
    assert_eq!(stats.records_extracted, 0);
    assert_eq!(requests_to(&site, "/next").await, 0);
    assert_eq!(requests_to(&store, INFOS).await, 1);
}

#[tokio::test]
async fn test_unreachable_store_fails_startup() {
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(dir.path(), &extractor, &extractor);
    config.store.api_base = "http://127.0.0.1:9".to_string();

    assert!(crawl(config).await.is_err());
}

/// Custom extractor that never finds anything
struct Nothing;

#[async_trait]
impl CustomExtractor for Nothing {
    fn name(&self) -> &str {
        "nothing"
    }

    async fn extract(&self, _html: &str, _url: &Url) -> Result<CustomOutput, PluginError> {
        Ok(CustomOutput::default())
    }
}

#[tokio::test]
async fn test_empty_custom_extractor_produces_nothing() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;
    let extractor = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(html(r#"<p>text</p><a href="/next">Next</a>"#))
        .mount(&site)
        .await;
    mount_empty_extraction(&extractor).await;

    let seed = Url::parse(&format!("{}/start", site.uri())).unwrap();
    let domain = network_location(&seed).unwrap();

    let config = create_test_config(dir.path(), &store, &extractor);
    let seen = Arc::new(SeenRegistry::new());
    let router = SiteRouter::new(true).register(&domain, Arc::new(Nothing));
    let pipeline = PagePipeline::new(
        router,
        Arc::new(ServiceExtractor::new(&config.extractor).unwrap()),
        Arc::clone(&seen),
    );
    let persister = Persister::new(
        Arc::new(PocketBaseStore::new(&store.uri()).unwrap()),
        "infos",
        FallbackCache::new(dir.path()),
    );
    let coordinator = Coordinator::new(
        &config.crawler,
        seen,
        Arc::new(HttpFetcher::new(&config.crawler).unwrap()),
        pipeline,
        persister,
    );

    let stats = coordinator
        .run(&[Site {
            url: seed.to_string(),
            activated: true,
        }])
        .await
        .unwrap();

    assert_eq!(stats.pages_completed, 1);
    assert_eq!(stats.records_extracted, 0);
    assert_eq!(stats.urls_enqueued, 1);
    assert!(extractor.received_requests().await.unwrap().is_empty());
    assert!(store.received_requests().await.unwrap().is_empty());
    assert!(cache_files(dir.path()).is_empty());
}
