//! Tests for system routes: health, OpenAPI, events.

use super::*;

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (router, _dispatcher, _tmp) = create_test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_endpoint_serves_the_spec() {
    let (router, _dispatcher, _tmp) = create_test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "scrapeflow REST API");
    assert!(body["paths"].get("/scrape").is_some());
    assert!(body["paths"].get("/task/{id}").is_some());
}

#[tokio::test]
async fn events_endpoint_is_a_server_sent_event_stream() {
    let (router, _dispatcher, _tmp) = create_test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/events")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(
        content_type.starts_with("text/event-stream"),
        "expected SSE content type, got {content_type:?}"
    );
}

#[tokio::test]
async fn swagger_ui_served_only_when_enabled() {
    // Disabled by default
    let (router, _dispatcher, _tmp) = create_test_router();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/swagger-ui")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Enabled via config
    let (dispatcher, config, _tmp) = create_test_dispatcher(Arc::new(StaticScraper));
    let mut config = (*config).clone();
    config.api.swagger_ui = true;
    let router = create_router(dispatcher, Arc::new(config));
    let response = router
        .oneshot(
            Request::builder()
                .uri("/swagger-ui")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert!(
        response.status() == StatusCode::OK || response.status().is_redirection(),
        "swagger-ui should be reachable when enabled, got {}",
        response.status()
    );
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (router, _dispatcher, _tmp) = create_test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
