//! HTML lookup route.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};

use super::SearchParams;
use crate::app::AppState;
use crate::error::HtmlError;
use crate::render;

/// GET /submit?query= - summary page.
pub async fn page(
    State(state): State<AppState>, query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Html<String>, HtmlError> {
    let Query(params) = query?;
    let resolved = state.resolver.resolve(params.query.as_deref()).await?;
    tracing::debug!(key = %resolved.key, source = ?resolved.source, "rendering summary page");
    Ok(Html(render::summary_page(&resolved.record)))
}
