//! # Deepsearch PDF
//!
//! Deep-search a topic across three independent public knowledge sources
//! (Wikipedia, arXiv and Crossref) and render the aggregated result into a
//! single citation-annotated PDF report.
//!
//! ## Architecture
//!
//! - [`models`]: the shared result model and progress events
//! - [`sources`]: one client per upstream API, each absorbing its own failures
//! - [`search`]: the settle-all aggregator joining the three fetches
//! - [`pdf`]: deterministic PDF composition with clickable citations
//! - [`utils`]: shared HTTP client
//!
//! A deep search always produces a best-effort document: per-source failures
//! degrade to absent or empty sections, and only PDF composition itself can
//! fail end to end.

pub mod models;
pub mod pdf;
pub mod search;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::DeepSearchResult;
pub use pdf::{compose, suggested_filename, ComposeError};
pub use search::{DeepSearch, QueryError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
