//! Content formatters
//!
//! A [`Formatter`] turns raw page text into cleaned content, or signals that
//! the input had nothing usable. The trait is the seam for remote
//! implementations (an LLM-backed formatter, for example); the crate ships a
//! deterministic plain-text normalizer.

use async_trait::async_trait;

use crate::error::Result;

/// Cleans raw extracted text into presentable content
#[async_trait]
pub trait Formatter: Send + Sync {
    /// Format `text`; `Ok(None)` means no usable output and the page is
    /// skipped without failing the task
    async fn format(&self, text: &str) -> Result<Option<String>>;
}

/// Whitespace and control-character normalizer
///
/// Collapses runs of blanks, drops non-printing control characters, and
/// preserves paragraph boundaries (blank lines). Output below the minimum
/// length is reported as unusable.
pub struct PlainTextFormatter {
    min_content_len: usize,
}

impl PlainTextFormatter {
    /// Formatter that rejects cleaned output shorter than `min_content_len`
    /// characters
    pub fn new(min_content_len: usize) -> Self {
        Self { min_content_len }
    }
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        // Anything non-empty counts as usable by default
        Self::new(1)
    }
}

#[async_trait]
impl Formatter for PlainTextFormatter {
    async fn format(&self, text: &str) -> Result<Option<String>> {
        let cleaned = normalize(text);
        if cleaned.chars().count() < self.min_content_len {
            return Ok(None);
        }
        Ok(Some(cleaned))
    }
}

/// Collapse whitespace within lines and blank-line runs between paragraphs
fn normalize(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let words: Vec<&str> = line
            .split_whitespace()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&words.join(" "));
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let joined = paragraphs.join("\n\n");
    joined
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect()
}
