//! REST API server module
//!
//! Provides the HTTP shim over the dispatcher: task submission, polling,
//! health, an event stream, and OpenAPI documentation.

use crate::{Config, Dispatcher, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `POST /scrape` - Submit a website ingestion task
/// - `POST /scrape/video` - Submit a video ingestion task (placeholder)
/// - `POST /scrape/document` - Submit a document ingestion task (placeholder)
/// - `GET /task/:id` - Poll a single task
/// - `GET /tasks` - List all tasks
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Router {
    let state = AppState::new(dispatcher, config.clone());

    let router = Router::new()
        // Tasks
        .route("/scrape", post(routes::submit_scrape))
        .route("/scrape/video", post(routes::submit_video))
        .route("/scrape/document", post(routes::submit_document))
        .route("/task/:id", get(routes::get_task))
        .route("/tasks", get(routes::list_tasks))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Merge Swagger UI routes if enabled in config (before applying state).
    // The UI reads the spec from the /openapi.json route defined above, so
    // only the static assets are registered here.
    let router = if config.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui").config(utoipa_swagger_ui::Config::from("/openapi.json")),
        )
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Origins may contain "*" to allow any origin; an empty list also allows
/// any origin (the default for local development).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Creates a TCP listener, binds it to the configured address, and serves
/// the API router until shut down.
pub async fn start_api_server(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(dispatcher, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
