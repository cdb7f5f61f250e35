use super::*;
use crate::dispatcher::Dispatcher;
use crate::error::Result as FlowResult;
use crate::scrape::{CrawlLimits, Scraper};
use crate::types::{ScrapeOutput, ScrapedPage, TaskKind};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

mod system;

/// Scraper producing fixed pages (one of them empty) without network access
struct StaticScraper;

#[async_trait]
impl Scraper for StaticScraper {
    async fn scrape(&self, source: &str, _limits: &CrawlLimits) -> FlowResult<ScrapeOutput> {
        Ok(ScrapeOutput {
            pages: vec![
                ScrapedPage {
                    url: source.to_string(),
                    text: "first page".to_string(),
                },
                ScrapedPage {
                    url: format!("{source}/empty"),
                    text: String::new(),
                },
                ScrapedPage {
                    url: format!("{source}/last"),
                    text: "third page".to_string(),
                },
            ],
            pages_scraped: 3,
        })
    }
}

/// Scraper that always fails, for FAILED-state flow tests
struct BrokenScraper;

#[async_trait]
impl Scraper for BrokenScraper {
    async fn scrape(&self, _source: &str, _limits: &CrawlLimits) -> FlowResult<ScrapeOutput> {
        Err(crate::error::Error::Scrape(
            "upstream unreachable".to_string(),
        ))
    }
}

/// Build a test dispatcher (artifacts under a tempdir) with the given
/// website scraper, plus its config and the tempdir keeping the artifacts
/// alive.
fn create_test_dispatcher(
    scraper: Arc<dyn Scraper>,
) -> (Arc<Dispatcher>, Arc<Config>, TempDir) {
    let temp_dir = TempDir::new().expect("tempdir");
    let mut config = Config::default();
    config.store.output_dir = temp_dir.path().join("downloads");

    let dispatcher = Dispatcher::new(config.clone())
        .expect("dispatcher")
        .with_scraper(TaskKind::Website, scraper);

    (Arc::new(dispatcher), Arc::new(config), temp_dir)
}

/// Router wired to a StaticScraper-backed dispatcher
fn create_test_router() -> (Router, Arc<Dispatcher>, TempDir) {
    let (dispatcher, config, temp_dir) = create_test_dispatcher(Arc::new(StaticScraper));
    let router = create_router(dispatcher.clone(), config);
    (router, dispatcher, temp_dir)
}

/// Deserialize a response body as JSON
async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Poll `GET /task/{id}` until the record is terminal (bounded wait)
async fn poll_until_terminal(router: &Router, task_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/task/{task_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let record = body_json(response).await;
        let status = record["status"].as_str().expect("status").to_string();
        if status == "COMPLETED" || status == "FAILED" {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never reached a terminal state");
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (dispatcher, _config, _temp_dir) = create_test_dispatcher(Arc::new(StaticScraper));

    // Use a random available port for testing
    let mut config = (*dispatcher.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().expect("addr"); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let config = config.clone();
        async move { start_api_server(dispatcher, config).await }
    });

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_headers_present_when_enabled() {
    let (dispatcher, _config, _temp_dir) = create_test_dispatcher(Arc::new(StaticScraper));

    let mut config = (*dispatcher.get_config()).clone();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let config = Arc::new(config);

    let app = create_router(dispatcher, config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_headers_absent_when_disabled() {
    let (dispatcher, _config, _temp_dir) = create_test_dispatcher(Arc::new(StaticScraper));

    let mut config = (*dispatcher.get_config()).clone();
    config.api.cors_enabled = false;
    let config = Arc::new(config);

    let app = create_router(dispatcher, config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be absent when CORS is disabled"
    );
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let (dispatcher, _config, _temp_dir) = create_test_dispatcher(Arc::new(StaticScraper));

    let mut config = (*dispatcher.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().expect("addr");
    let dispatcher = Arc::new(
        Dispatcher::new(config).expect("dispatcher").with_scraper(
            TaskKind::Website,
            Arc::new(StaticScraper) as Arc<dyn Scraper>,
        ),
    );

    let api_handle = dispatcher.spawn_api_server();

    tokio::time::sleep(Duration::from_millis(100)).await;

    api_handle.abort();
}
