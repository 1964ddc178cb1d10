//! Core data structures for the deep-search pipeline.

mod progress;
mod result;

pub use progress::{ProgressEvent, SourceKind, StepStatus};
pub use result::{DeepSearchResult, EncyclopediaSummary, ScholarlyEntry, WorkEntry};
