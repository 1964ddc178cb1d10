//! Per-source progress events emitted during an aggregation run.

use serde::{Deserialize, Serialize};

/// Which of the three sources an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Encyclopedia,
    Scholarly,
    Works,
}

impl SourceKind {
    /// Human-readable source name.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Encyclopedia => "Wikipedia",
            SourceKind::Scholarly => "arXiv",
            SourceKind::Works => "Crossref",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lifecycle state of one source fetch.
///
/// `Error` means the source settled without contributing data; it never
/// corresponds to a raised error, since the clients absorb their failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Idle,
    Running,
    Done,
    Error,
}

/// One discrete progress notification from the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub source: SourceKind,
    pub status: StepStatus,
    /// Short human-readable note, e.g. an article title or an entry count
    pub detail: Option<String>,
}

impl ProgressEvent {
    pub fn new(source: SourceKind, status: StepStatus) -> Self {
        Self {
            source,
            status,
            detail: None,
        }
    }

    pub fn with_detail(source: SourceKind, status: StepStatus, detail: impl Into<String>) -> Self {
        Self {
            source,
            status,
            detail: Some(detail.into()),
        }
    }
}
