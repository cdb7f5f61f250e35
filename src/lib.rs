//! # scrapeflow
//!
//! Asynchronous content-ingestion backend: submit a URL, and a background
//! pipeline crawls it, formats the extracted text, and persists a JSON
//! artifact — all without blocking the submitter, who polls for progress.
//!
//! ## Design Philosophy
//!
//! scrapeflow is designed to be:
//! - **Non-blocking** - Submission returns immediately; pipelines run as
//!   independent tokio tasks
//! - **Observable** - Poll the task registry or subscribe to lifecycle events
//! - **Pluggable** - Scrapers and formatters are trait objects; a new
//!   pipeline variant is one `with_scraper` call
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use scrapeflow::{Config, Dispatcher, SubmitRequest, TaskKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(Config::default())?;
//!
//!     let submission = dispatcher.submit(
//!         TaskKind::Website,
//!         SubmitRequest::new("https://example.com"),
//!     )?;
//!     println!("accepted as {}", submission.id);
//!
//!     // Poll until terminal
//!     loop {
//!         let record = dispatcher.task(&submission.id)?;
//!         if record.status.is_terminal() {
//!             println!("finished: {:?}", record.result);
//!             break;
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(200)).await;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Task dispatcher (submission, scheduling)
pub mod dispatcher;
/// Error types
pub mod error;
/// Content formatters
pub mod format;
/// Pipeline state machine
mod pipeline;
/// In-memory task registry
pub mod registry;
/// Content scrapers
pub mod scrape;
/// Artifact store
pub mod store;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, CrawlConfig, StoreConfig};
pub use dispatcher::{Dispatcher, SubmitRequest, Submission};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use format::{Formatter, PlainTextFormatter};
pub use registry::TaskRegistry;
pub use scrape::{CrawlLimits, Scraper, WebsiteScraper};
pub use store::{Artifact, ArtifactMetadata, ArtifactStore};
pub use types::{
    Event, FormattedPage, ScrapeOutput, ScrapedPage, TaskId, TaskKind, TaskOutcome, TaskRecord,
    TaskStatus,
};

/// Wait for a termination signal (SIGTERM/SIGINT on Unix, Ctrl+C elsewhere).
///
/// Useful for embedding the API server in a binary:
///
/// ```no_run
/// use scrapeflow::{Config, Dispatcher};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let dispatcher = Arc::new(Dispatcher::new(Config::default())?);
///     let _server = dispatcher.spawn_api_server();
///
///     scrapeflow::wait_for_shutdown().await;
///     Ok(())
/// }
/// ```
pub async fn wait_for_shutdown() {
    wait_for_signal().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
