//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the scrapeflow REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the scrapeflow REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "scrapeflow REST API",
        version = "0.1.0",
        description = "REST API for submitting content-ingestion tasks and polling their progress",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8420", description = "Local development server")
    ),
    paths(
        // Tasks
        crate::api::routes::submit_scrape,
        crate::api::routes::submit_video,
        crate::api::routes::submit_document,
        crate::api::routes::get_task,
        crate::api::routes::list_tasks,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskId,
        crate::types::TaskStatus,
        crate::types::TaskKind,
        crate::types::TaskOutcome,
        crate::types::TaskRecord,
        crate::types::FormattedPage,
        crate::types::Event,

        // Request/response types
        crate::dispatcher::SubmitRequest,
        crate::api::routes::SubmitResponse,

        // Error envelope
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Task submission and polling"),
        (name = "system", description = "Health, events, and API metadata")
    )
)]
pub struct ApiDoc;
