//! Pipeline runner
//!
//! Drives one task from PENDING through SCRAPING and FORMATTING to a
//! terminal state, consulting the scraper, formatter, and artifact store.
//! Exactly one runner executes per task; nothing here is re-entrant.
//!
//! Stage execution returns a discriminated result, so the FAILED transition
//! is an explicit branch in [`PipelineRunner::run`] rather than a side
//! effect of error propagation — and no failure ever escapes the runner
//! boundary.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::format::Formatter;
use crate::registry::TaskRegistry;
use crate::scrape::{CrawlLimits, Scraper};
use crate::store::ArtifactStore;
use crate::types::{
    Event, FormattedPage, ScrapedPage, TaskId, TaskOutcome, TaskStatus,
};

/// What a successful pipeline execution produced
struct Completion {
    artifact_location: String,
    page_count: usize,
}

/// Executes the scrape → format → persist pipeline for a single task
pub(crate) struct PipelineRunner {
    registry: TaskRegistry,
    scraper: Arc<dyn Scraper>,
    formatter: Arc<dyn Formatter>,
    store: ArtifactStore,
    event_tx: broadcast::Sender<Event>,
}

impl PipelineRunner {
    pub(crate) fn new(
        registry: TaskRegistry,
        scraper: Arc<dyn Scraper>,
        formatter: Arc<dyn Formatter>,
        store: ArtifactStore,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            registry,
            scraper,
            formatter,
            store,
            event_tx,
        }
    }

    /// Run the task to a terminal state
    ///
    /// Every failure ends up inside the task's record; this method never
    /// returns an error and never panics past the runner.
    pub(crate) async fn run(self, id: TaskId, source: String, limits: CrawlLimits) {
        match self.execute(&id, &source, &limits).await {
            Ok(completion) => {
                tracing::info!(
                    task_id = %id,
                    pages = completion.page_count,
                    location = %completion.artifact_location,
                    "task completed"
                );
                self.finish(
                    &id,
                    TaskStatus::Completed,
                    TaskOutcome::Completed {
                        artifact_location: completion.artifact_location.clone(),
                        page_count: completion.page_count,
                    },
                );
                self.emit(Event::Completed {
                    id,
                    artifact_location: completion.artifact_location,
                    page_count: completion.page_count,
                });
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(task_id = %id, error = %message, "task failed");
                self.finish(
                    &id,
                    TaskStatus::Failed,
                    TaskOutcome::Failed {
                        error: message.clone(),
                    },
                );
                self.emit(Event::Failed { id, error: message });
            }
        }
    }

    /// The happy path: each stage either advances the record or bubbles an
    /// error up to [`run`]'s failure branch
    async fn execute(&self, id: &TaskId, source: &str, limits: &CrawlLimits) -> Result<Completion> {
        self.registry.update(id, TaskStatus::Scraping, None)?;
        self.emit(Event::ScrapeStarted { id: id.clone() });

        let output = self.scraper.scrape(source, limits).await?;

        self.registry.update(id, TaskStatus::Formatting, None)?;
        self.emit(Event::FormatStarted {
            id: id.clone(),
            pages: output.pages.len(),
        });

        let formatted = self.format_pages(id, &output.pages).await;

        let artifact_location = self
            .store
            .persist(id, source, output.pages_scraped, &formatted)
            .await?;

        Ok(Completion {
            artifact_location,
            page_count: output.pages_scraped,
        })
    }

    /// Format each page in order; pages with empty text or unusable output
    /// are skipped, and a formatter failure on one page only drops that page
    async fn format_pages(&self, id: &TaskId, pages: &[ScrapedPage]) -> Vec<FormattedPage> {
        let mut formatted = Vec::new();

        for page in pages {
            if page.text.is_empty() {
                tracing::debug!(task_id = %id, url = %page.url, "skipping page with no text");
                continue;
            }
            match self.formatter.format(&page.text).await {
                Ok(Some(content)) => formatted.push(FormattedPage {
                    url: page.url.clone(),
                    formatted_content: content,
                }),
                Ok(None) => {
                    tracing::debug!(task_id = %id, url = %page.url, "formatter produced no usable output");
                }
                Err(e) => {
                    tracing::warn!(task_id = %id, url = %page.url, error = %e, "formatter failed for page");
                }
            }
        }

        formatted
    }

    /// Write the terminal state; a rejected write here means the record was
    /// externally finalized, which we log rather than propagate
    fn finish(&self, id: &TaskId, status: TaskStatus, outcome: TaskOutcome) {
        if let Err(e) = self.registry.update(id, status, Some(outcome)) {
            tracing::error!(task_id = %id, error = %e, "could not record terminal state");
        }
    }

    fn emit(&self, event: Event) {
        // send() errs when nobody subscribes, which is fine
        self.event_tx.send(event).ok();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::error::Error;
    use crate::types::{ScrapeOutput, TaskKind};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Scraper returning a canned output or a canned failure
    struct StubScraper {
        result: std::result::Result<ScrapeOutput, String>,
    }

    #[async_trait]
    impl Scraper for StubScraper {
        async fn scrape(&self, _source: &str, _limits: &CrawlLimits) -> Result<ScrapeOutput> {
            match &self.result {
                Ok(output) => Ok(output.clone()),
                Err(msg) => Err(Error::Scrape(msg.clone())),
            }
        }
    }

    /// Formatter that rejects configured texts and errors on others
    struct SelectiveFormatter {
        reject_containing: Option<String>,
        fail_containing: Option<String>,
    }

    impl SelectiveFormatter {
        fn passthrough() -> Self {
            Self {
                reject_containing: None,
                fail_containing: None,
            }
        }
    }

    #[async_trait]
    impl Formatter for SelectiveFormatter {
        async fn format(&self, text: &str) -> Result<Option<String>> {
            if let Some(marker) = &self.fail_containing {
                if text.contains(marker.as_str()) {
                    return Err(Error::Format(format!("cannot format {marker:?}")));
                }
            }
            if let Some(marker) = &self.reject_containing {
                if text.contains(marker.as_str()) {
                    return Ok(None);
                }
            }
            Ok(Some(format!("formatted: {text}")))
        }
    }

    struct Harness {
        registry: TaskRegistry,
        runner_parts: (Arc<dyn Scraper>, Arc<dyn Formatter>, ArtifactStore),
        event_tx: broadcast::Sender<Event>,
        _tmp: TempDir,
    }

    impl Harness {
        fn new(scraper: StubScraper, formatter: SelectiveFormatter) -> Self {
            let tmp = TempDir::new().unwrap();
            let store = ArtifactStore::new(&StoreConfig {
                output_dir: tmp.path().to_path_buf(),
                public_base: "/downloads".to_string(),
            });
            let (event_tx, _rx) = broadcast::channel(64);
            Self {
                registry: TaskRegistry::new(),
                runner_parts: (Arc::new(scraper), Arc::new(formatter), store),
                event_tx,
                _tmp: tmp,
            }
        }

        async fn run_task(&self) -> TaskId {
            let record = self.registry.create(TaskKind::Website, "https://example.com");
            let (scraper, formatter, store) = self.runner_parts.clone();
            let runner = PipelineRunner::new(
                self.registry.clone(),
                scraper,
                formatter,
                store,
                self.event_tx.clone(),
            );
            let limits = CrawlLimits {
                max_depth: 2,
                max_pages: 100,
                max_workers: 5,
                include_subdomains: true,
            };
            runner
                .run(record.id.clone(), record.source.clone(), limits)
                .await;
            record.id
        }

        fn artifact_count(&self) -> usize {
            std::fs::read_dir(self._tmp.path()).unwrap().count()
        }

        fn read_artifact(&self) -> serde_json::Value {
            let entry = std::fs::read_dir(self._tmp.path())
                .unwrap()
                .next()
                .unwrap()
                .unwrap();
            serde_json::from_slice(&std::fs::read(entry.path()).unwrap()).unwrap()
        }
    }

    fn pages(specs: &[(&str, &str)]) -> ScrapeOutput {
        let pages: Vec<ScrapedPage> = specs
            .iter()
            .map(|(url, text)| ScrapedPage {
                url: url.to_string(),
                text: text.to_string(),
            })
            .collect();
        ScrapeOutput {
            pages_scraped: pages.len(),
            pages,
        }
    }

    #[tokio::test]
    async fn empty_text_pages_are_skipped_but_counted() {
        let harness = Harness::new(
            StubScraper {
                result: Ok(pages(&[
                    ("https://e.com/1", "alpha"),
                    ("https://e.com/2", ""),
                    ("https://e.com/3", "gamma"),
                ])),
            },
            SelectiveFormatter::passthrough(),
        );

        let id = harness.run_task().await;

        let record = harness.registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        match record.result.unwrap() {
            TaskOutcome::Completed { page_count, .. } => {
                assert_eq!(page_count, 3, "page_count reflects the crawl total");
            }
            other => panic!("expected Completed outcome, got {other:?}"),
        }

        let artifact = harness.read_artifact();
        let results = artifact["results"].as_array().unwrap();
        assert_eq!(results.len(), 2, "the empty page must be skipped");
        assert_eq!(results[0]["url"], "https://e.com/1");
        assert_eq!(results[1]["url"], "https://e.com/3");
    }

    #[tokio::test]
    async fn formatter_rejection_skips_only_that_page() {
        let harness = Harness::new(
            StubScraper {
                result: Ok(pages(&[
                    ("https://e.com/1", "reject me"),
                    ("https://e.com/2", "keep"),
                ])),
            },
            SelectiveFormatter {
                reject_containing: Some("reject".to_string()),
                fail_containing: None,
            },
        );

        let id = harness.run_task().await;

        let record = harness.registry.get(&id).unwrap();
        assert_eq!(
            record.status,
            TaskStatus::Completed,
            "a rejected page must not fail the task"
        );

        let artifact = harness.read_artifact();
        let results = artifact["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["url"], "https://e.com/2");
        assert_eq!(results[0]["formatted_content"], "formatted: keep");
    }

    #[tokio::test]
    async fn formatter_error_on_one_page_does_not_abort_the_task() {
        let harness = Harness::new(
            StubScraper {
                result: Ok(pages(&[
                    ("https://e.com/1", "explode"),
                    ("https://e.com/2", "fine"),
                ])),
            },
            SelectiveFormatter {
                reject_containing: None,
                fail_containing: Some("explode".to_string()),
            },
        );

        let id = harness.run_task().await;

        let record = harness.registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);

        let artifact = harness.read_artifact();
        let results = artifact["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["url"], "https://e.com/2");
    }

    #[tokio::test]
    async fn scraper_failure_fails_the_task_without_writing_an_artifact() {
        let harness = Harness::new(
            StubScraper {
                result: Err("connection refused".to_string()),
            },
            SelectiveFormatter::passthrough(),
        );

        let id = harness.run_task().await;

        let record = harness.registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        match record.result.unwrap() {
            TaskOutcome::Failed { error } => {
                assert!(!error.is_empty(), "failure must carry a message");
                assert!(error.contains("connection refused"));
                assert!(error.contains("scrape"), "message names the stage: {error}");
            }
            other => panic!("expected Failed outcome, got {other:?}"),
        }

        assert_eq!(
            harness.artifact_count(),
            0,
            "no artifact may be written for a failed scrape"
        );
    }

    #[tokio::test]
    async fn zero_pages_still_completes_with_empty_results() {
        let harness = Harness::new(
            StubScraper {
                result: Ok(ScrapeOutput::default()),
            },
            SelectiveFormatter::passthrough(),
        );

        let id = harness.run_task().await;

        let record = harness.registry.get(&id).unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        match record.result.unwrap() {
            TaskOutcome::Completed {
                page_count,
                artifact_location,
            } => {
                assert_eq!(page_count, 0);
                assert!(artifact_location.starts_with("/downloads/"));
            }
            other => panic!("expected Completed outcome, got {other:?}"),
        }

        let artifact = harness.read_artifact();
        assert_eq!(artifact["metadata"]["pages_scraped"], 0);
        assert_eq!(artifact["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn status_transitions_are_observed_in_order() {
        let harness = Harness::new(
            StubScraper {
                result: Ok(pages(&[("https://e.com/1", "text")])),
            },
            SelectiveFormatter::passthrough(),
        );
        let mut events = harness.event_tx.subscribe();

        let id = harness.run_task().await;

        // Events arrive strictly in stage order for a single task
        assert!(matches!(
            events.try_recv().unwrap(),
            Event::ScrapeStarted { id: ref eid } if *eid == id
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            Event::FormatStarted { pages: 1, .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            Event::Completed { page_count: 1, .. }
        ));
    }

    #[tokio::test]
    async fn failed_event_carries_the_error_message() {
        let harness = Harness::new(
            StubScraper {
                result: Err("boom".to_string()),
            },
            SelectiveFormatter::passthrough(),
        );
        let mut events = harness.event_tx.subscribe();

        harness.run_task().await;

        // ScrapeStarted then Failed
        assert!(matches!(
            events.try_recv().unwrap(),
            Event::ScrapeStarted { .. }
        ));
        match events.try_recv().unwrap() {
            Event::Failed { error, .. } => assert!(error.contains("boom")),
            other => panic!("expected Failed event, got {other:?}"),
        }
    }
}
