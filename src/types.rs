//! Core types for scrapeflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for an ingestion task
///
/// Ids are generated by the task registry from a UTC timestamp plus a
/// process-lifetime sequence counter, so two tasks submitted within the
/// same clock tick still receive distinct ids.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a TaskId from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task status
///
/// Transitions are monotonic along `Pending → Scraping → Formatting →
/// Completed`; `Failed` is reachable from any non-terminal state and is
/// absorbing. Once a task is terminal its record never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Accepted and waiting for its pipeline to start
    Pending,
    /// Crawling pages from the source
    Scraping,
    /// Formatting scraped page text
    Formatting,
    /// Finished successfully, artifact written
    Completed,
    /// Failed at some pipeline stage
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (Completed or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Scraping => "SCRAPING",
            TaskStatus::Formatting => "FORMATTING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// Pipeline variant requested for a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Crawl a website starting from a URL
    Website,
    /// Extract content from a video source (placeholder variant)
    Video,
    /// Extract content from a document source (placeholder variant)
    Document,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskKind::Website => "website",
            TaskKind::Video => "video",
            TaskKind::Document => "document",
        };
        write!(f, "{s}")
    }
}

/// Terminal result payload of a task
///
/// Present on a record if and only if the task is terminal. The variant is
/// tagged so clients never have to probe an open map of optional keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The pipeline ran to completion and wrote an artifact
    Completed {
        /// Location clients can use to retrieve the artifact
        artifact_location: String,
        /// Total number of pages the crawl stage reported (not the number
        /// of formatted entries)
        page_count: usize,
    },
    /// The pipeline failed at some stage
    Failed {
        /// Human-readable failure message (includes the failing stage)
        error: String,
    },
}

/// A task record as held by the registry and returned to polling clients
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskRecord {
    /// Unique task identifier
    pub id: TaskId,

    /// Which pipeline variant was requested
    pub kind: TaskKind,

    /// The original source URL
    pub source: String,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated (non-decreasing across updates)
    pub updated_at: DateTime<Utc>,

    /// Terminal result, present iff status is Completed or Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskOutcome>,
}

/// A single page produced by a scraper
///
/// `text` may be empty; the formatting stage skips such pages without
/// disturbing the ordering of the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Page URL
    pub url: String,
    /// Extracted text content (may be empty)
    pub text: String,
}

/// The full output of a scrape stage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapeOutput {
    /// Pages in crawl emission order
    pub pages: Vec<ScrapedPage>,
    /// Total page count reported by the crawl (what `page_count` on the
    /// completed task reflects)
    pub pages_scraped: usize,
}

/// A formatted result item, emitted only for pages whose text was non-empty
/// and whose formatting succeeded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormattedPage {
    /// Page URL
    pub url: String,
    /// Cleaned/structured content
    pub formatted_content: String,
}

/// Event emitted during the task lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task accepted and queued for execution
    Queued {
        /// Task ID
        id: TaskId,
        /// Pipeline variant
        kind: TaskKind,
    },

    /// Crawl stage started
    ScrapeStarted {
        /// Task ID
        id: TaskId,
    },

    /// Formatting stage started
    FormatStarted {
        /// Task ID
        id: TaskId,
        /// Number of pages handed to the formatter
        pages: usize,
    },

    /// Task finished successfully
    Completed {
        /// Task ID
        id: TaskId,
        /// Artifact retrieval location
        artifact_location: String,
        /// Total crawled page count
        page_count: usize,
    },

    /// Task failed at some stage
    Failed {
        /// Task ID
        id: TaskId,
        /// Error message
        error: String,
    },
}
