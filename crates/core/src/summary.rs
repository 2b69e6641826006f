//! The summary record cached and served for a query.

use serde::{Deserialize, Serialize};

/// The three fields kept from an upstream page summary.
///
/// Serialized as `{"page", "title", "summary"}`, which is both the cached value
/// and the JSON API response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Canonical desktop URL of the article.
    pub page: String,
    /// Display title.
    pub title: String,
    /// Long-form extract text.
    pub summary: String,
}

impl SummaryRecord {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, page: impl Into<String>) -> Self {
        Self { page: page.into(), title: title.into(), summary: summary.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let record = SummaryRecord::new(
            "Albert Einstein",
            "Albert Einstein was a German-born theoretical physicist.",
            "https://en.wikipedia.org/wiki/Albert_Einstein",
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["page"], "https://en.wikipedia.org/wiki/Albert_Einstein");
        assert_eq!(value["title"], "Albert Einstein");
        assert!(value["summary"].as_str().unwrap().starts_with("Albert Einstein was"));
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_partial_record_rejected() {
        let json = r#"{"page": "https://en.wikipedia.org/wiki/Rust", "title": "Rust"}"#;
        assert!(serde_json::from_str::<SummaryRecord>(json).is_err());
    }
}
