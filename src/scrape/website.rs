//! Website scraper: bounded breadth-first crawl with HTML text extraction

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::scrape::{CrawlLimits, Scraper};
use crate::types::{ScrapeOutput, ScrapedPage};

/// Crawls a website breadth-first from a start URL
///
/// Fetches within one depth level run concurrently through a bounded worker
/// pool (`max_workers`), but page order stays deterministic: pages are
/// emitted in frontier order, level by level. A fetch failure on the start
/// URL fails the crawl; failures on deeper pages only drop that page.
pub struct WebsiteScraper {
    client: reqwest::Client,
    body_selector: Selector,
    anchor_selector: Selector,
}

/// One successfully fetched document: extracted text plus outbound links
struct FetchedDoc {
    url: Url,
    text: String,
    links: Vec<Url>,
}

impl WebsiteScraper {
    /// Build a scraper with the configured HTTP client settings
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            body_selector: parse_selector("body")?,
            anchor_selector: parse_selector("a[href]")?,
        })
    }

    /// Fetch one page and extract its text and same-document links
    ///
    /// Returns a plain `String` error so callers can decide whether the
    /// failure is fatal (start page) or soft (deeper pages).
    async fn fetch_page(&self, url: Url) -> std::result::Result<FetchedDoc, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| format!("fetch {url} failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("fetch {url} returned HTTP {status}"));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = response
            .text()
            .await
            .map_err(|e| format!("read body of {url} failed: {e}"))?;

        if content_type.contains("html") {
            let (text, links) = self.extract_document(&url, &body);
            Ok(FetchedDoc { url, text, links })
        } else if content_type.starts_with("text/") {
            Ok(FetchedDoc {
                url,
                text: body.trim().to_string(),
                links: Vec::new(),
            })
        } else {
            // Binary or unknown payload: record the page, contribute no text
            Ok(FetchedDoc {
                url,
                text: String::new(),
                links: Vec::new(),
            })
        }
    }

    /// Parse an HTML body into visible text and resolved outbound links
    ///
    /// Runs synchronously; the parsed DOM never crosses an await point.
    fn extract_document(&self, base: &Url, body: &str) -> (String, Vec<Url>) {
        let document = Html::parse_document(body);

        let mut text = String::new();
        if let Some(root) = document.select(&self.body_selector).next() {
            collect_text(root, &mut text);
        }

        let mut links = Vec::new();
        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(mut target) = base.join(href) else {
                continue;
            };
            if !matches!(target.scheme(), "http" | "https") {
                continue;
            }
            target.set_fragment(None);
            links.push(target);
        }

        (text, links)
    }
}

#[async_trait]
impl Scraper for WebsiteScraper {
    async fn scrape(&self, source: &str, limits: &CrawlLimits) -> Result<ScrapeOutput> {
        let start = Url::parse(source)
            .map_err(|e| Error::Scrape(format!("invalid start URL {source:?}: {e}")))?;
        if !matches!(start.scheme(), "http" | "https") {
            return Err(Error::Scrape(format!(
                "unsupported URL scheme {:?} for {source:?}",
                start.scheme()
            )));
        }
        let root_host = start
            .host_str()
            .ok_or_else(|| Error::Scrape(format!("start URL {source:?} has no host")))?
            .to_string();

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(dedup_key(&start));

        // The start page is mandatory; its failure fails the crawl.
        let first = self.fetch_page(start).await.map_err(Error::Scrape)?;

        let mut pages: Vec<ScrapedPage> = Vec::new();
        let mut frontier: Vec<Url> = Vec::new();
        admit_page(
            first,
            limits,
            0,
            &root_host,
            &mut visited,
            &mut pages,
            &mut frontier,
        );

        let mut depth = 1u32;
        while depth <= limits.max_depth && !frontier.is_empty() && pages.len() < limits.max_pages {
            let mut batch: Vec<Url> = std::mem::take(&mut frontier);
            batch.truncate(limits.max_pages - pages.len());

            tracing::debug!(depth, batch = batch.len(), "crawling next level");

            // `buffered` (not `buffer_unordered`) keeps frontier order while
            // still running up to max_workers fetches concurrently.
            let results = stream::iter(batch)
                .map(|url| self.fetch_page(url))
                .buffered(limits.max_workers.max(1))
                .collect::<Vec<_>>()
                .await;

            for result in results {
                if pages.len() >= limits.max_pages {
                    break;
                }
                match result {
                    Ok(doc) => admit_page(
                        doc,
                        limits,
                        depth,
                        &root_host,
                        &mut visited,
                        &mut pages,
                        &mut frontier,
                    ),
                    Err(reason) => {
                        tracing::warn!(depth, %reason, "page fetch dropped");
                    }
                }
            }

            depth += 1;
        }

        tracing::info!(
            pages = pages.len(),
            levels = depth,
            "crawl finished"
        );

        Ok(ScrapeOutput {
            pages_scraped: pages.len(),
            pages,
        })
    }
}

/// Record a fetched document and queue its in-scope links for the next level
fn admit_page(
    doc: FetchedDoc,
    limits: &CrawlLimits,
    depth: u32,
    root_host: &str,
    visited: &mut HashSet<String>,
    pages: &mut Vec<ScrapedPage>,
    frontier: &mut Vec<Url>,
) {
    if depth < limits.max_depth {
        for link in doc.links {
            let Some(host) = link.host_str() else {
                continue;
            };
            if !host_in_scope(root_host, host, limits.include_subdomains) {
                continue;
            }
            if visited.insert(dedup_key(&link)) {
                frontier.push(link);
            }
        }
    }

    pages.push(ScrapedPage {
        url: doc.url.to_string(),
        text: doc.text,
    });
}

/// Whether `host` belongs to the crawl scope rooted at `root_host`
fn host_in_scope(root_host: &str, host: &str, include_subdomains: bool) -> bool {
    if host.eq_ignore_ascii_case(root_host) {
        return true;
    }
    if !include_subdomains {
        return false;
    }
    let suffix = format!(".{}", root_host.to_ascii_lowercase());
    host.to_ascii_lowercase().ends_with(&suffix)
}

/// Canonical key for the visited set (fragment already stripped on links)
fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

/// Append the visible text under `element`, skipping script-like subtrees
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if matches!(element.value().name(), "script" | "style" | "noscript") {
        return;
    }
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            collect_text(el, out);
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Config {
        message: format!("invalid CSS selector {selector:?}: {e}"),
        key: None,
    })
}
