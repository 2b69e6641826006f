//! Unified error types for wikicache.
//!
//! Lookup failures (`InvalidQuery`, `NotFound`, `Upstream`) are kept apart so the
//! HTTP layer can decide how each one is presented.

use std::fmt;

use tokio_rusqlite::rusqlite;

/// Why a raw query was rejected before any lookup happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIssue {
    /// No `query` parameter was supplied at all.
    Missing,
    /// The parameter was present but empty.
    Empty,
}

impl fmt::Display for QueryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryIssue::Missing => f.write_str("missing"),
            QueryIssue::Empty => f.write_str("empty"),
        }
    }
}

/// Unified error types for the wikicache service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query was absent or empty.
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(QueryIssue),

    /// Neither the term nor its spelling correction exists upstream.
    #[error("NOT_FOUND: {term}")]
    NotFound {
        /// Canonical term of the original query.
        term: String,
        /// Canonical term of the corrected query, when a correction was tried.
        corrected: Option<String>,
    },

    /// The upstream answered with something other than a summary or a 404.
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A cached value could not be encoded or decoded.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound { term: "Albert_Einstien".to_string(), corrected: None };
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("Albert_Einstien"));
    }

    #[test]
    fn test_query_issue_display() {
        assert_eq!(Error::InvalidQuery(QueryIssue::Missing).to_string(), "INVALID_QUERY: missing");
        assert_eq!(Error::InvalidQuery(QueryIssue::Empty).to_string(), "INVALID_QUERY: empty");
    }

    #[test]
    fn test_rusqlite_error_is_database() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("CACHE_ERROR"));
    }
}
