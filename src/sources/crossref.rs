//! Crossref bibliographic-works client.

use serde::Deserialize;
use std::sync::Arc;

use crate::models::WorkEntry;
use crate::sources::{SourceError, DEFAULT_RESULT_LIMIT};
use crate::utils::HttpClient;

/// Base URL for the Crossref works endpoint
const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// Crossref works source.
///
/// Searches the cross-publisher metadata index and normalizes each record
/// into a [`WorkEntry`]. Total fetch or parse failure degrades to an empty
/// list; this client never raises outward.
#[derive(Debug, Clone)]
pub struct CrossrefClient {
    client: Arc<HttpClient>,
    base_url: String,
    limit: usize,
}

impl CrossrefClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: CROSSREF_API_URL.to_string(),
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

    /// Cap the number of works kept per query.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Fetch up to `limit` work records for a topic, in the index's ranking
    /// order. Returns an empty list on any failure.
    pub async fn fetch_works(&self, topic: &str) -> Vec<WorkEntry> {
        match self.try_fetch(topic).await {
            Ok(works) => works,
            Err(err) => {
                tracing::warn!(topic, error = %err, "Crossref search degraded to empty");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, topic: &str) -> Result<Vec<WorkEntry>, SourceError> {
        let url = format!(
            "{}?query={}&rows={}",
            self.base_url,
            urlencoding::encode(topic.trim()),
            self.limit
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Crossref: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Crossref API returned status: {}",
                response.status()
            )));
        }

        let data: CrResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data
            .message
            .items
            .into_iter()
            .filter_map(parse_item)
            .take(self.limit)
            .collect())
    }
}

/// Normalize one Crossref item, or drop it when it has no usable title.
fn parse_item(item: CrItem) -> Option<WorkEntry> {
    let title = item
        .title
        .into_iter()
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())?;

    let authors = item
        .author
        .into_iter()
        .filter_map(|a| match (a.given, a.family) {
            (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
            (None, Some(family)) => Some(family),
            (Some(given), None) => Some(given),
            (None, None) => a.name,
        })
        .collect();

    // Most granular available date field, year is its first component
    let year = item
        .issued
        .as_ref()
        .and_then(|d| d.date_parts.first())
        .and_then(|parts| parts.first())
        .and_then(|y| *y);

    let source_url = item
        .url
        .or_else(|| item.doi.map(|doi| format!("https://doi.org/{}", doi)));

    Some(WorkEntry {
        title,
        authors,
        year,
        source_url,
    })
}

// ===== Crossref API types =====

#[derive(Debug, Deserialize)]
struct CrResponse {
    message: CrMessage,
}

#[derive(Debug, Deserialize)]
struct CrMessage {
    #[serde(default)]
    items: Vec<CrItem>,
}

#[derive(Debug, Deserialize)]
struct CrItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrAuthor>,
    issued: Option<CrDate>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrAuthor {
    given: Option<String>,
    family: Option<String>,
    // Organizational contributors carry a single name field
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}
