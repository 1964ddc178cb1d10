//! Clients for the three upstream knowledge sources.
//!
//! Each client normalizes one external API into the shared result model and
//! absorbs its own failures: the encyclopedia client degrades to `None`, the
//! two list clients degrade to an empty `Vec`. Nothing in this module raises
//! to the aggregator; absorbed failures are logged via `tracing` instead.

mod arxiv;
mod crossref;
mod wikipedia;

pub use arxiv::ArxivClient;
pub use crossref::CrossrefClient;
pub use wikipedia::WikipediaClient;

/// Default cap on entries kept per list source.
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Errors that can occur while talking to an upstream source.
///
/// These never cross a client boundary; they exist so each client can log
/// what it absorbed before degrading to an absent/empty value.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status from the source API
    #[error("API error: {0}")]
    Api(String),

    /// Parsing error (JSON, Atom feed)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed "no such record" response
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
