//! Task dispatcher
//!
//! The dispatcher is the top-level service: it owns the task registry, the
//! per-kind scraper set, the formatter, and the artifact store. `submit`
//! validates a request, creates the PENDING record, and schedules exactly
//! one pipeline runner without blocking the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use url::Url;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{Formatter, PlainTextFormatter};
use crate::pipeline::PipelineRunner;
use crate::registry::TaskRegistry;
use crate::scrape::{CrawlLimits, Scraper, WebsiteScraper};
use crate::store::ArtifactStore;
use crate::types::{Event, TaskId, TaskKind, TaskRecord};

/// Capacity of the lifecycle event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// A content-ingestion submission
///
/// Limits left unset fall back to the configured defaults before validation.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct SubmitRequest {
    /// Start URL to crawl
    pub source: String,

    /// Crawl depth (levels of links beyond the start page)
    #[serde(default)]
    pub depth: Option<u32>,

    /// Maximum number of pages to fetch
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Worker-pool size for concurrent page fetches
    #[serde(default)]
    pub max_workers: Option<usize>,

    /// Whether to crawl subdomains of the start host
    #[serde(default)]
    pub include_subdomains: Option<bool>,
}

impl SubmitRequest {
    /// Request for `source` with all limits left to the configured defaults
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            depth: None,
            max_pages: None,
            max_workers: None,
            include_subdomains: None,
        }
    }
}

/// An accepted submission: the task id plus the handle of its spawned
/// pipeline
///
/// The handle exists so future cancellation/timeout support has something to
/// hold onto; dropping it detaches the pipeline, it does not cancel it.
#[derive(Debug)]
pub struct Submission {
    /// Id of the created task
    pub id: TaskId,
    /// Join handle of the spawned pipeline runner
    pub handle: tokio::task::JoinHandle<()>,
}

/// Accepts submissions and runs them through the pipeline (cheap to clone
/// behind an Arc)
pub struct Dispatcher {
    config: Arc<Config>,
    registry: TaskRegistry,
    scrapers: HashMap<TaskKind, Arc<dyn Scraper>>,
    formatter: Arc<dyn Formatter>,
    store: ArtifactStore,
    event_tx: broadcast::Sender<Event>,
}

impl Dispatcher {
    /// Create a dispatcher with the website scraper and the plain-text
    /// formatter registered
    pub fn new(config: Config) -> Result<Self> {
        let website = WebsiteScraper::new(&config.crawl)?;
        let store = ArtifactStore::new(&config.store);
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut scrapers: HashMap<TaskKind, Arc<dyn Scraper>> = HashMap::new();
        scrapers.insert(TaskKind::Website, Arc::new(website));

        Ok(Self {
            config: Arc::new(config),
            registry: TaskRegistry::new(),
            scrapers,
            formatter: Arc::new(PlainTextFormatter::default()),
            store,
            event_tx,
        })
    }

    /// Register (or replace) the scraper for a pipeline variant
    ///
    /// Adding a video or document variant is exactly this: supply the
    /// scraper, the state machine stays untouched.
    pub fn with_scraper(mut self, kind: TaskKind, scraper: Arc<dyn Scraper>) -> Self {
        self.scrapers.insert(kind, scraper);
        self
    }

    /// Replace the formatter
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Validate a request, create its task, and schedule its pipeline
    ///
    /// Returns immediately after spawning; pipeline progress is observable
    /// through [`task`](Self::task) and [`subscribe`](Self::subscribe).
    pub fn submit(&self, kind: TaskKind, request: SubmitRequest) -> Result<Submission> {
        let scraper = self
            .scrapers
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::NotSupported(format!("no scraper registered for {kind}")))?;

        let source = request.source.trim().to_string();
        let limits = self.resolve_limits(&source, &request)?;

        let record = self.registry.create(kind, &source);
        let id = record.id.clone();

        tracing::info!(
            task_id = %id,
            %kind,
            source = %source,
            depth = limits.max_depth,
            max_pages = limits.max_pages,
            max_workers = limits.max_workers,
            "task accepted"
        );

        self.emit_event(Event::Queued {
            id: id.clone(),
            kind,
        });

        let runner = PipelineRunner::new(
            self.registry.clone(),
            scraper,
            self.formatter.clone(),
            self.store.clone(),
            self.event_tx.clone(),
        );
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            runner.run(task_id, source, limits).await;
        });

        Ok(Submission { id, handle })
    }

    /// Read-only snapshot of one task
    pub fn task(&self, id: &TaskId) -> Result<TaskRecord> {
        self.registry.get(id)
    }

    /// Snapshot of all tasks, newest first
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.registry.list()
    }

    /// Subscribe to task lifecycle events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber lagging more than the channel capacity
    /// sees a `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let dispatcher = Arc::clone(self);
        let config = self.get_config();

        tokio::spawn(async move { crate::api::start_api_server(dispatcher, config).await })
    }

    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Fill unset limits from config defaults and enforce the caps
    fn resolve_limits(&self, source: &str, request: &SubmitRequest) -> Result<CrawlLimits> {
        if source.is_empty() {
            return Err(Error::Validation("source must not be empty".to_string()));
        }
        let parsed = Url::parse(source)
            .map_err(|e| Error::Validation(format!("source is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Validation(format!(
                "source must be an http(s) URL, got scheme {:?}",
                parsed.scheme()
            )));
        }

        let crawl = &self.config.crawl;
        let limits = CrawlLimits {
            max_depth: request.depth.unwrap_or(crawl.default_depth),
            max_pages: request.max_pages.unwrap_or(crawl.default_max_pages),
            max_workers: request.max_workers.unwrap_or(crawl.default_max_workers),
            include_subdomains: request
                .include_subdomains
                .unwrap_or(crawl.default_include_subdomains),
        };

        if limits.max_depth > crawl.depth_cap {
            return Err(Error::Validation(format!(
                "depth {} exceeds the maximum of {}",
                limits.max_depth, crawl.depth_cap
            )));
        }
        if limits.max_pages == 0 || limits.max_pages > crawl.pages_cap {
            return Err(Error::Validation(format!(
                "max_pages must be between 1 and {}, got {}",
                crawl.pages_cap, limits.max_pages
            )));
        }
        if limits.max_workers == 0 || limits.max_workers > crawl.workers_cap {
            return Err(Error::Validation(format!(
                "max_workers must be between 1 and {}, got {}",
                crawl.workers_cap, limits.max_workers
            )));
        }

        Ok(limits)
    }
}
