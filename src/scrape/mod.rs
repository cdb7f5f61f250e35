//! Content scrapers
//!
//! A [`Scraper`] turns a start URL plus crawl limits into an ordered
//! collection of pages. The pipeline runner is generic over this trait, so a
//! new pipeline variant (video, document) means supplying a new scraper
//! implementation, not duplicating the state machine.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ScrapeOutput;

mod website;

pub use website::WebsiteScraper;

/// Limits applied to a single crawl
///
/// The dispatcher resolves these from the submission (falling back to
/// configured defaults) and validates them against the configured caps; the
/// pipeline passes them through to the scraper unmodified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrawlLimits {
    /// How many link levels beyond the start page to follow (0 = start page only)
    pub max_depth: u32,
    /// Maximum number of pages to fetch
    pub max_pages: usize,
    /// Size of the bounded worker pool fanning out page fetches
    pub max_workers: usize,
    /// Whether subdomains of the start host are in scope
    pub include_subdomains: bool,
}

/// A content extractor: start URL + limits in, ordered pages out
///
/// Implementations must emit pages in a deterministic order — the formatted
/// result list the pipeline produces preserves it.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Crawl `source` within `limits` and return the pages found
    ///
    /// A failure here fails the whole task; per-page soft failures should be
    /// handled internally (drop the page, keep crawling).
    async fn scrape(&self, source: &str, limits: &CrawlLimits) -> Result<ScrapeOutput>;
}
