//! Settle-all aggregation over the three source clients.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::models::{DeepSearchResult, ProgressEvent, SourceKind, StepStatus};
use crate::sources::{ArxivClient, CrossrefClient, WikipediaClient};
use crate::utils::HttpClient;

/// The single failure path of an aggregation run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query is empty after trimming whitespace
    #[error("Query must not be empty")]
    Empty,
}

/// Deep-search orchestrator.
///
/// Dispatches the three clients concurrently and joins with settle-all
/// semantics: the run completes only after every source has settled, either
/// with data or by degrading to absent/empty inside its client. The clients
/// share no mutable state, so the join needs no coordination beyond waiting.
#[derive(Debug, Clone)]
pub struct DeepSearch {
    wikipedia: WikipediaClient,
    arxiv: ArxivClient,
    crossref: CrossrefClient,
}

impl DeepSearch {
    /// Create an orchestrator with default clients sharing one HTTP client.
    pub fn new() -> Self {
        let http = Arc::new(HttpClient::new());
        Self {
            wikipedia: WikipediaClient::new(Arc::clone(&http)),
            arxiv: ArxivClient::new(Arc::clone(&http)),
            crossref: CrossrefClient::new(http),
        }
    }

    /// Create from preconfigured clients (custom limits or endpoints).
    pub fn with_clients(
        wikipedia: WikipediaClient,
        arxiv: ArxivClient,
        crossref: CrossrefClient,
    ) -> Self {
        Self {
            wikipedia,
            arxiv,
            crossref,
        }
    }

    /// Run a deep search for a query.
    pub async fn run(&self, query: &str) -> Result<DeepSearchResult, QueryError> {
        self.run_with_progress(query, None).await
    }

    /// Run a deep search, emitting one `Running` and one terminal
    /// [`ProgressEvent`] per source to `progress` when provided.
    pub async fn run_with_progress(
        &self,
        query: &str,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<DeepSearchResult, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::Empty);
        }

        tracing::info!(query, "starting deep search");
        let emit = |event: ProgressEvent| {
            if let Some(tx) = &progress {
                // A dropped receiver only means nobody is watching
                let _ = tx.send(event);
            }
        };

        for source in [SourceKind::Encyclopedia, SourceKind::Scholarly, SourceKind::Works] {
            emit(ProgressEvent::new(source, StepStatus::Running));
        }

        let encyclopedia_fut = async {
            let summary = self.wikipedia.fetch_summary(query).await;
            let event = match &summary {
                Some(s) => ProgressEvent::with_detail(
                    SourceKind::Encyclopedia,
                    StepStatus::Done,
                    s.title.clone(),
                ),
                None => ProgressEvent::with_detail(
                    SourceKind::Encyclopedia,
                    StepStatus::Error,
                    "No result",
                ),
            };
            emit(event);
            summary
        };

        let scholarly_fut = async {
            let entries = self.arxiv.fetch_entries(query).await;
            let status = if entries.is_empty() {
                StepStatus::Error
            } else {
                StepStatus::Done
            };
            emit(ProgressEvent::with_detail(
                SourceKind::Scholarly,
                status,
                format!("{} entries", entries.len()),
            ));
            entries
        };

        let works_fut = async {
            let works = self.crossref.fetch_works(query).await;
            let status = if works.is_empty() {
                StepStatus::Error
            } else {
                StepStatus::Done
            };
            emit(ProgressEvent::with_detail(
                SourceKind::Works,
                status,
                format!("{} entries", works.len()),
            ));
            works
        };

        // Settle-all: every branch runs to completion regardless of the others
        let (encyclopedia, scholarly, works) =
            tokio::join!(encyclopedia_fut, scholarly_fut, works_fut);

        tracing::info!(
            query,
            encyclopedia = encyclopedia.is_some(),
            scholarly = scholarly.len(),
            works = works.len(),
            "deep search settled"
        );

        Ok(DeepSearchResult {
            query: query.to_string(),
            encyclopedia,
            scholarly,
            works,
        })
    }
}

impl Default for DeepSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let search = DeepSearch::new();
        assert_eq!(search.run("").await.unwrap_err(), QueryError::Empty);
        assert_eq!(search.run("   \t ").await.unwrap_err(), QueryError::Empty);
    }

    #[tokio::test]
    async fn test_unreachable_sources_settle_empty() {
        // Nothing listens on these endpoints, so every source degrades
        let http = Arc::new(HttpClient::new());
        let search = DeepSearch::with_clients(
            WikipediaClient::with_base_url(Arc::clone(&http), "http://127.0.0.1:1/summary"),
            ArxivClient::with_base_url(Arc::clone(&http), "http://127.0.0.1:1/query"),
            CrossrefClient::with_base_url(http, "http://127.0.0.1:1/works"),
        );

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let result = search
            .run_with_progress("  quantum gravity  ", Some(tx))
            .await
            .unwrap();

        assert_eq!(result.query, "quantum gravity");
        assert!(result.encyclopedia.is_none());
        assert!(result.scholarly.is_empty());
        assert!(result.works.is_empty());

        // One Running and one terminal event per source
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 6);
        for source in [SourceKind::Encyclopedia, SourceKind::Scholarly, SourceKind::Works] {
            assert!(events
                .iter()
                .any(|e| e.source == source && e.status == StepStatus::Running));
            assert!(events
                .iter()
                .any(|e| e.source == source && e.status == StepStatus::Error));
        }
    }
}
