//! Router assembly and shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use wikicache_client::Resolver;
use wikicache_core::AppConfig;

use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver: Arc::new(resolver) }
    }
}

/// Assets shipped with the server crate.
const BUNDLED_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the router with static assets, tracing and a whole-request timeout.
///
/// A request that outlives `request_timeout_ms` is answered with 408.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let static_dir = config.static_dir.clone().unwrap_or_else(|| PathBuf::from(BUNDLED_STATIC_DIR));

    Router::new()
        .route("/", get(routes::home::page))
        .route("/submit", get(routes::submit::page))
        .route("/submit/api", get(routes::api::lookup))
        .route("/health", get(routes::health::check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
