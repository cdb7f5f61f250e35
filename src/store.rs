//! Artifact store
//!
//! Writes a completed pipeline's output to a uniquely named JSON document
//! under a configurable output directory and hands back a location string
//! clients can use for retrieval. Serving the file is someone else's job.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::types::{FormattedPage, TaskId};

/// The persisted artifact document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Crawl metadata
    pub metadata: ArtifactMetadata,
    /// Formatted pages in crawl order
    pub results: Vec<FormattedPage>,
}

/// Metadata block of an [`Artifact`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Original source URL
    pub url: String,
    /// Total page count reported by the crawl stage
    pub pages_scraped: usize,
    /// Artifact creation timestamp (`YYYYMMDD_HHMMSS`)
    pub timestamp: String,
}

/// Writes artifacts to disk (cheap to clone)
#[derive(Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    public_base: String,
}

impl ArtifactStore {
    /// Build a store from its configuration
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            public_base: config.public_base.trim_end_matches('/').to_string(),
        }
    }

    /// Persist one task's formatted output as a JSON artifact
    ///
    /// Creates the output directory if needed (idempotent) and names the
    /// file `<task_id>_<timestamp>.json`, so repeated runs never collide.
    /// Content is written as UTF-8 with non-ASCII text intact. Returns the
    /// location string handed back to clients.
    pub async fn persist(
        &self,
        id: &TaskId,
        source: &str,
        pages_scraped: usize,
        results: &[FormattedPage],
    ) -> Result<String> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let filename = format!("{id}_{timestamp}.json");
        let path = self.output_dir.join(&filename);

        let artifact = Artifact {
            metadata: ArtifactMetadata {
                url: source.to_string(),
                pages_scraped,
                timestamp,
            },
            results: results.to_vec(),
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create output directory '{}': {e}",
                        self.output_dir.display()
                    ),
                )
            })?;

        // serde_json writes UTF-8 without escaping non-ASCII, so text
        // round-trips byte-faithfully.
        let body = serde_json::to_vec_pretty(&artifact)?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to write artifact '{}': {e}", path.display()),
            )
        })?;

        tracing::info!(task_id = %id, path = %path.display(), "artifact written");

        Ok(format!("{}/{filename}", self.public_base))
    }
}
