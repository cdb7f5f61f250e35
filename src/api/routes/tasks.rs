//! Task submission and polling handlers.

use super::SubmitResponse;
use crate::api::AppState;
use crate::dispatcher::SubmitRequest;
use crate::error::Error;
use crate::types::{TaskId, TaskKind, TaskRecord, TaskStatus};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// POST /scrape - Submit a website ingestion task
#[utoipa::path(
    post,
    path = "/scrape",
    tag = "tasks",
    request_body = SubmitRequest,
    responses(
        (status = 202, description = "Task accepted", body = SubmitResponse),
        (status = 400, description = "Invalid submission"),
    )
)]
pub async fn submit_scrape(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, Error> {
    submit(state, TaskKind::Website, request)
}

/// POST /scrape/video - Submit a video ingestion task (placeholder variant)
#[utoipa::path(
    post,
    path = "/scrape/video",
    tag = "tasks",
    request_body = SubmitRequest,
    responses(
        (status = 202, description = "Task accepted", body = SubmitResponse),
        (status = 400, description = "Invalid submission"),
        (status = 501, description = "No video scraper registered"),
    )
)]
pub async fn submit_video(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, Error> {
    submit(state, TaskKind::Video, request)
}

/// POST /scrape/document - Submit a document ingestion task (placeholder variant)
#[utoipa::path(
    post,
    path = "/scrape/document",
    tag = "tasks",
    request_body = SubmitRequest,
    responses(
        (status = 202, description = "Task accepted", body = SubmitResponse),
        (status = 400, description = "Invalid submission"),
        (status = 501, description = "No document scraper registered"),
    )
)]
pub async fn submit_document(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, Error> {
    submit(state, TaskKind::Document, request)
}

/// Shared submission path for all pipeline variants
fn submit(
    state: AppState,
    kind: TaskKind,
    request: SubmitRequest,
) -> Result<(StatusCode, Json<SubmitResponse>), Error> {
    let submission = state.dispatcher.submit(kind, request)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            task_id: submission.id,
            status: TaskStatus::Pending,
            message: format!("{kind} ingestion task started"),
        }),
    ))
}

/// GET /task/:id - Poll a single task
#[utoipa::path(
    get,
    path = "/task/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task record", body = TaskRecord),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskRecord>, Error> {
    let record = state.dispatcher.task(&TaskId::new(id))?;
    Ok(Json(record))
}

/// GET /tasks - List all tasks, newest first
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "All task records", body = Vec<TaskRecord>),
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskRecord>> {
    Json(state.dispatcher.tasks())
}
