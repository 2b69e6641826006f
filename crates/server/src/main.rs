//! wikicache server entry point.
//!
//! Loads configuration, opens the cache, loads the spelling dictionary, and
//! serves the lookup routes over HTTP. Logs are JSON on stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use wikicache_client::{Resolver, ResolverOptions, SpellCorrector, SummaryClient, SummaryConfig};
use wikicache_core::{AppConfig, CacheBackend, CacheDb, MemoryCache, SummaryCache};

mod app;
mod error;
mod maintenance;
mod render;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let cache = open_cache(&config).await?;
    let corrector = load_corrector(&config)?;
    let fetcher = Arc::new(SummaryClient::new(SummaryConfig::from_app(&config))?);
    let resolver = Resolver::new(cache.clone(), fetcher, corrector, ResolverOptions::from_app(&config));

    if let Some(interval) = config.purge_interval() {
        maintenance::spawn_purge(cache, interval);
    }

    let router = app::router(app::AppState::new(resolver), &config);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("shut down");
    Ok(())
}

async fn open_cache(config: &AppConfig) -> Result<Arc<dyn SummaryCache>> {
    match config.cache_backend {
        CacheBackend::Sqlite => {
            let db = CacheDb::open(&config.db_path)
                .await
                .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
            tracing::info!(path = %config.db_path.display(), "using SQLite cache");
            Ok(Arc::new(db))
        }
        CacheBackend::Memory => {
            tracing::info!("using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

fn load_corrector(config: &AppConfig) -> Result<Option<Arc<SpellCorrector>>> {
    if !config.correction_enabled {
        tracing::info!("spelling correction disabled");
        return Ok(None);
    }

    let corrector = match &config.dictionary_path {
        Some(path) => SpellCorrector::from_file(path, config.max_edit_distance)?,
        None => SpellCorrector::bundled(config.max_edit_distance)?,
    };
    tracing::info!(words = corrector.len(), "loaded spelling dictionary");

    Ok(Some(Arc::new(corrector)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
