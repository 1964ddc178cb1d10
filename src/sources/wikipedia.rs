//! Wikipedia REST summary client.

use serde::Deserialize;
use std::sync::Arc;

use crate::models::EncyclopediaSummary;
use crate::sources::SourceError;
use crate::utils::HttpClient;

/// Base URL for the Wikipedia REST summary endpoint
const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Wikipedia encyclopedic source.
///
/// Fetches the summary record for a topic, treating it as a page-title key.
/// Every failure mode (page not found, disambiguation, transport error,
/// malformed body) degrades to `None`; this client never raises outward.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: Arc<HttpClient>,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: WIKIPEDIA_API_URL.to_string(),
        }
    }

    /// Create with a custom endpoint (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch the summary for a topic, or `None` when no unambiguous article
    /// exists or the source is unreachable.
    pub async fn fetch_summary(&self, topic: &str) -> Option<EncyclopediaSummary> {
        match self.try_fetch(topic).await {
            Ok(summary) => summary,
            Err(SourceError::NotFound(_)) => {
                tracing::debug!(topic, "no Wikipedia article for topic");
                None
            }
            Err(err) => {
                tracing::warn!(topic, error = %err, "Wikipedia lookup degraded to absent");
                None
            }
        }
    }

    async fn try_fetch(&self, topic: &str) -> Result<Option<EncyclopediaSummary>, SourceError> {
        let title = topic.trim().replace(' ', "_");
        let url = format!("{}/{}", self.base_url, urlencoding::encode(&title));

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch Wikipedia summary: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(title));
        }

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Wikipedia API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Ok(parse_summary(&body)?)
    }
}

/// Parse a summary response body into an [`EncyclopediaSummary`].
///
/// Disambiguation pages resolve to `None`: the query did not identify one
/// article, and picking an arbitrary branch would misattribute the overview.
/// Plain redirects never reach this point; the REST endpoint follows them
/// server-side.
fn parse_summary(body: &str) -> Result<Option<EncyclopediaSummary>, SourceError> {
    let page: SummaryPage = serde_json::from_str(body)?;

    if page.page_type.as_deref() == Some("disambiguation") {
        return Ok(None);
    }

    let source_url = page
        .content_urls
        .and_then(|u| u.desktop)
        .map(|d| d.page)
        .unwrap_or_default();

    if page.title.is_empty() || source_url.is_empty() {
        return Err(SourceError::Parse(
            "summary response missing title or canonical URL".to_string(),
        ));
    }

    Ok(Some(EncyclopediaSummary {
        title: page.title,
        extract: page.extract.unwrap_or_default(),
        source_url,
    }))
}

// ===== Wikipedia REST API types =====

#[derive(Debug, Deserialize)]
struct SummaryPage {
    #[serde(default)]
    title: String,
    extract: Option<String>,
    #[serde(rename = "type")]
    page_type: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: String,
}
