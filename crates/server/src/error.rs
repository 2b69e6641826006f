//! HTTP-facing errors for wikicache.
//!
//! Lookup failures map to a status and a user-facing message. The JSON routes
//! render them as `{"error": message}`; the HTML routes render the same message
//! as a page through [`HtmlError`].

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use wikicache_core::{Error, QueryIssue};

use crate::render;

/// Structured errors for the wikicache server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No query parameters detected")]
    MissingQuery,

    #[error("No search detected")]
    EmptyQuery,

    /// The query string could not be decoded, e.g. a repeated `query` key.
    #[error("Malformed query parameters")]
    BadQuery(String),

    #[error("Page not found. Check for a typo in your search")]
    NotFound,

    #[error("The encyclopedia could not be reached. Try again later")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Status for the JSON routes.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery | ApiError::EmptyQuery | ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status for the HTML routes. An empty search is answered with a normal page.
    pub fn html_status(&self) -> StatusCode {
        match self {
            ApiError::EmptyQuery => StatusCode::OK,
            other => other.status(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidQuery(QueryIssue::Missing) => ApiError::MissingQuery,
            Error::InvalidQuery(QueryIssue::Empty) => ApiError::EmptyQuery,
            Error::NotFound { .. } => ApiError::NotFound,
            Error::Upstream(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadQuery(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log(&self);
        let body = ErrorResponse { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

/// An [`ApiError`] rendered as an HTML page.
#[derive(Debug)]
pub struct HtmlError(pub ApiError);

impl From<Error> for HtmlError {
    fn from(err: Error) -> Self {
        HtmlError(err.into())
    }
}

impl From<QueryRejection> for HtmlError {
    fn from(rejection: QueryRejection) -> Self {
        HtmlError(rejection.into())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        log(&self.0);
        (self.0.html_status(), Html(render::message_page(&self.0.to_string()))).into_response()
    }
}

fn log(err: &ApiError) {
    match err {
        ApiError::BadQuery(detail) => tracing::debug!("rejected query string: {}", detail),
        ApiError::Upstream(detail) => tracing::warn!("upstream lookup failed: {}", detail),
        ApiError::Internal(detail) => tracing::error!("lookup failed: {}", detail),
        _ => {}
    }
}
