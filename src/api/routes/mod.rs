//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] — Submission and task polling
//! - [`system`] — Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` continues to work
pub use system::*;
pub use tasks::*;

use crate::types::{TaskId, TaskStatus};

/// Response for POST /scrape (and the variant endpoints)
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    /// Id of the created task; poll `GET /task/{id}` with it
    pub task_id: TaskId,
    /// Status at acceptance time (always PENDING)
    pub status: TaskStatus,
    /// Human-readable acceptance message
    pub message: String,
}
