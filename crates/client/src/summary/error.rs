//! Summary API client error types.

use std::sync::Arc;

/// Errors from the upstream summary API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SummaryError {
    /// The upstream has no page for the term (HTTP 404).
    #[error("no summary for {0}")]
    NotFound(String),

    /// Non-success HTTP status other than 404.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// The payload parsed but lacks one of the fields a record needs.
    #[error("missing field in summary payload: {0}")]
    MissingField(&'static str),

    /// Invalid base URL or term.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SummaryError::Timeout } else { SummaryError::Network(Arc::new(err)) }
    }
}

impl From<SummaryError> for wikicache_core::Error {
    /// Anything but a 404 is an upstream failure; callers handle 404 before converting.
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::NotFound(term) => wikicache_core::Error::NotFound { term, corrected: None },
            other => wikicache_core::Error::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SummaryError::HttpError { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = SummaryError::MissingField("extract");
        assert!(err.to_string().contains("extract"));
    }

    #[test]
    fn test_into_core_error() {
        let err: wikicache_core::Error = SummaryError::Timeout.into();
        assert!(matches!(err, wikicache_core::Error::Upstream(_)));

        let err: wikicache_core::Error = SummaryError::NotFound("Foo".into()).into();
        assert!(matches!(err, wikicache_core::Error::NotFound { .. }));
    }
}
