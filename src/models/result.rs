//! Aggregated deep-search result and its per-source sub-models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single encyclopedic summary record for the query topic.
///
/// Present only when the topic resolves to an unambiguous article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncyclopediaSummary {
    /// Resolved article title
    pub title: String,

    /// Plain-text article extract
    pub extract: String,

    /// Canonical article URL
    pub source_url: String,
}

/// One scholarly-paper record from the academic preprint index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarlyEntry {
    /// Paper title
    pub title: String,

    /// Author display names, in source order. Never empty.
    pub authors: Vec<String>,

    /// Publication date
    pub published: NaiveDate,

    /// Canonical abstract-page URL
    pub source_url: String,
}

/// One bibliographic work record from the cross-publisher metadata index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEntry {
    /// Work title
    pub title: String,

    /// Author display names, in source order. May be empty.
    pub authors: Vec<String>,

    /// Publication year, when the record carries one
    pub year: Option<i32>,

    /// DOI-derived or publisher URL, when present
    pub source_url: Option<String>,
}

impl WorkEntry {
    /// Render the author list for display.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

impl ScholarlyEntry {
    /// Render the author list for display.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

/// Everything the deep search produced for one query.
///
/// `scholarly` and `works` are always present as sequences (empty, not
/// absent); `encyclopedia` is the only field that can be absent, covering
/// both "no article found" and "source unreachable". Entry ordering is the
/// upstream ranking order and is never changed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepSearchResult {
    /// The query, trimmed, exactly as searched
    pub query: String,

    /// Encyclopedic overview, if the topic resolved to one article
    pub encyclopedia: Option<EncyclopediaSummary>,

    /// Scholarly papers, in upstream order
    pub scholarly: Vec<ScholarlyEntry>,

    /// Bibliographic works, in upstream order
    pub works: Vec<WorkEntry>,
}

impl DeepSearchResult {
    /// True when no source contributed anything beyond the query itself.
    pub fn is_empty(&self) -> bool {
        self.encyclopedia.is_none() && self.scholarly.is_empty() && self.works.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_line() {
        let entry = WorkEntry {
            title: "Test".to_string(),
            authors: vec!["Ada Lovelace".to_string(), "Charles Babbage".to_string()],
            year: Some(1843),
            source_url: None,
        };
        assert_eq!(entry.author_line(), "Ada Lovelace, Charles Babbage");
    }

    #[test]
    fn test_is_empty() {
        let result = DeepSearchResult {
            query: "anything".to_string(),
            encyclopedia: None,
            scholarly: Vec::new(),
            works: Vec::new(),
        };
        assert!(result.is_empty());

        let with_summary = DeepSearchResult {
            encyclopedia: Some(EncyclopediaSummary {
                title: "Anything".to_string(),
                extract: "An article.".to_string(),
                source_url: "https://en.wikipedia.org/wiki/Anything".to_string(),
            }),
            ..result
        };
        assert!(!with_summary.is_empty());
    }
}
