//! JSON lookup route.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use wikicache_core::SummaryRecord;

use super::SearchParams;
use crate::app::AppState;
use crate::error::ApiError;

/// GET /submit/api?query= - `{page, summary, title}`.
pub async fn lookup(
    State(state): State<AppState>, query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SummaryRecord>, ApiError> {
    let Query(params) = query?;
    let resolved = state.resolver.resolve(params.query.as_deref()).await?;
    tracing::debug!(key = %resolved.key, source = ?resolved.source, "returning summary");
    Ok(Json(resolved.record))
}
