//! External knowledge fetch collaborator.
//!
//! The orchestrator only distinguishes success from absence; every
//! implementation detail of the lookup (exact title, fuzzy correction,
//! disambiguation rejection, summary trimming) lives behind this trait.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::Result;

/// Contract for the external encyclopedia lookup.
#[async_trait]
pub trait KnowledgeFetcher: Send + Sync {
    /// Fetch a trimmed summary for a search term, or `None` when the term
    /// resolves to nothing usable.
    async fn fetch(&self, term: &str, long_form: bool) -> Result<Option<String>>;
}

/// MediaWiki-backed fetcher: exact title lookup first, then a fuzzy search
/// for the closest title and a retry with the corrected name.
pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

impl Default for WikipediaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WikipediaClient {
    pub fn new() -> Self {
        Self::with_base_url("https://en.wikipedia.org")
    }

    /// Point the client at a different host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Intro extract for an exact page title; `None` when the title misses.
    async fn extract_for_title(&self, title: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), title, "Extract request failed");
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        let Some(pages) = data["query"]["pages"].as_object() else {
            return Ok(None);
        };

        for (page_id, page) in pages {
            if page_id == "-1" {
                continue;
            }
            if let Some(extract) = page["extract"].as_str() {
                if !extract.is_empty() {
                    return Ok(Some(extract.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Closest matching page title via the search API.
    async fn best_match_title(&self, term: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", term),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        Ok(data["query"]["search"][0]["title"]
            .as_str()
            .map(|t| t.to_string()))
    }
}

#[async_trait]
impl KnowledgeFetcher for WikipediaClient {
    async fn fetch(&self, term: &str, long_form: bool) -> Result<Option<String>> {
        let mut extract = self.extract_for_title(term).await?;

        if extract.is_none() {
            debug!(term, "No exact match, trying fuzzy search");
            if let Some(corrected) = self.best_match_title(term).await? {
                debug!(term, corrected, "Fuzzy match found");
                extract = self.extract_for_title(&corrected).await?;
            }
        }

        let Some(extract) = extract else {
            return Ok(None);
        };

        // Disambiguation pages are useless as answers
        if extract.contains("may refer to") || extract.contains("refer to:") {
            return Ok(None);
        }

        Ok(trim_summary(&extract, long_form))
    }
}

/// Trim a raw extract to the first qualifying sentences and normalize
/// trailing punctuation. Summaries under 50 characters are rejected.
pub fn trim_summary(extract: &str, long_form: bool) -> Option<String> {
    let sentence_count = if long_form { 12 } else { 5 };
    let sentences: Vec<&str> = extract
        .split(". ")
        .filter(|s| s.trim().len() > 20)
        .collect();

    let mut summary = sentences
        .into_iter()
        .take(sentence_count)
        .collect::<Vec<_>>()
        .join(". ");

    if !summary.is_empty() && !summary.ends_with('.') {
        summary.push('.');
    }
    while summary.contains("..") {
        summary = summary.replace("..", ".");
    }
    let summary = summary.trim().to_string();

    if summary.len() < 50 {
        None
    } else {
        Some(summary)
    }
}
