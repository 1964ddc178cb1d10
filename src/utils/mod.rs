//! Utility modules supporting the deep-search pipeline.
//!
//! - [`HttpClient`]: shared HTTP client with crate-derived user agent and
//!   per-request timeouts
//! - [`REQUEST_TIMEOUT`]: the timeout applied to every outbound call

mod http;

pub use http::{HttpClient, REQUEST_TIMEOUT};
