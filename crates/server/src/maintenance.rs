//! Background sweep of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use wikicache_core::SummaryCache;

/// Delete expired entries once per `interval` until the runtime shuts down.
pub fn spawn_purge(cache: Arc<dyn SummaryCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match cache.purge_expired().await {
                Ok(0) => tracing::debug!("cache purge: nothing expired"),
                Ok(deleted) => tracing::info!(deleted, "purged expired cache entries"),
                Err(e) => tracing::warn!("cache purge failed: {}", e),
            }
        }
    })
}
