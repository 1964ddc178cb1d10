//! arXiv scholarly-paper client.

use feed_rs::parser;
use std::sync::Arc;

use crate::models::ScholarlyEntry;
use crate::sources::{SourceError, DEFAULT_RESULT_LIMIT};
use crate::utils::HttpClient;

/// Base URL for the arXiv API
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv scholarly source.
///
/// Searches the preprint index with the free-text topic and normalizes the
/// Atom feed into [`ScholarlyEntry`] records. Total fetch or parse failure
/// degrades to an empty list; this client never raises outward.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Arc<HttpClient>,
    base_url: String,
    limit: usize,
}

impl ArxivClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: ARXIV_API_URL.to_string(),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Create with a custom endpoint (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Cap the number of entries kept per query.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Fetch up to `limit` scholarly entries for a topic, in the index's
    /// ranking order. Returns an empty list on any failure.
    pub async fn fetch_entries(&self, topic: &str) -> Vec<ScholarlyEntry> {
        match self.try_fetch(topic).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(topic, error = %err, "arXiv search degraded to empty");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, topic: &str) -> Result<Vec<ScholarlyEntry>, SourceError> {
        let url = format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&format!("all:{}", topic.trim())),
            self.limit
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let feed = parser::parse(bytes.as_ref())
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        Ok(feed
            .entries
            .iter()
            .filter_map(parse_entry)
            .take(self.limit)
            .collect())
    }
}

/// Normalize one Atom entry, or drop it when a required field is missing.
fn parse_entry(entry: &feed_rs::model::Entry) -> Option<ScholarlyEntry> {
    let title = entry.title.as_ref().map(|t| t.content.trim().to_string())?;
    if title.is_empty() {
        return None;
    }

    let authors: Vec<String> = entry
        .authors
        .iter()
        .map(|a| a.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if authors.is_empty() {
        return None;
    }

    let published = entry.published.map(|d| d.date_naive())?;

    // The entry id is the canonical abstract URL
    let source_url = entry.id.trim().to_string();
    if source_url.is_empty() {
        return None;
    }

    Some(ScholarlyEntry {
        title,
        authors,
        published,
        source_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FEED_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <feed xmlns="http://www.w3.org/2005/Atom">
            <title>ArXiv Query Results</title>
            <entry>
                <id>http://arxiv.org/abs/2301.12345v1</id>
                <title>Denoising Diffusion Probabilistic Models Revisited</title>
                <summary>We revisit diffusion models.</summary>
                <published>2023-01-15T10:00:00Z</published>
                <author><name>Alice Chen</name></author>
                <author><name>Bob Miller</name></author>
                <link rel="alternate" type="text/html" href="http://arxiv.org/abs/2301.12345v1"/>
            </entry>
            <entry>
                <id>http://arxiv.org/abs/2302.00001v2</id>
                <title>Untitled Placeholder</title>
                <summary>Entry with no authors must be dropped.</summary>
                <published>2023-02-01T00:00:00Z</published>
            </entry>
        </feed>"#;

    #[test]
    fn test_parse_feed() {
        let feed = parser::parse(FEED_BODY.as_bytes()).unwrap();
        let entries: Vec<_> = feed.entries.iter().filter_map(parse_entry).collect();

        // The author-less entry is dropped
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Denoising Diffusion Probabilistic Models Revisited");
        assert_eq!(entry.authors, vec!["Alice Chen", "Bob Miller"]);
        assert_eq!(entry.published, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        assert_eq!(entry.source_url, "http://arxiv.org/abs/2301.12345v1");
    }

    #[tokio::test]
    async fn test_fetch_entries_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED_BODY)
            .create_async()
            .await;

        let client = ArxivClient::with_base_url(Arc::new(HttpClient::new()), server.url());
        let entries = client.fetch_entries("diffusion models").await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_entries_failure_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = ArxivClient::with_base_url(Arc::new(HttpClient::new()), server.url());
        assert!(client.fetch_entries("anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_entries_malformed_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body("this is not a feed")
            .create_async()
            .await;

        let client = ArxivClient::with_base_url(Arc::new(HttpClient::new()), server.url());
        assert!(client.fetch_entries("anything").await.is_empty());
    }
}
