//! In-process summary cache.
//!
//! Uses a HashMap behind a tokio RwLock with per-entry deadlines. Nothing
//! survives a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SummaryCache;
use crate::{CanonicalTerm, Error, SummaryRecord};

/// Upper bound on a stored TTL (ten years).
const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

struct CachedSummary {
    record: SummaryRecord,
    expires_at: Instant,
}

impl CachedSummary {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local [`SummaryCache`].
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CachedSummary>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn get(&self, key: &CanonicalTerm) -> Result<Option<SummaryRecord>, Error> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key.as_str())
            .filter(|cached| !cached.is_expired())
            .map(|cached| cached.record.clone()))
    }

    async fn set(&self, key: &CanonicalTerm, record: &SummaryRecord, ttl: Duration) -> Result<(), Error> {
        let expires_at = Instant::now() + ttl.min(MAX_TTL);

        let mut entries = self.entries.write().await;
        entries.insert(key.as_str().to_string(), CachedSummary { record: record.clone(), expires_at });
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| !cached.is_expired());
        Ok((before - entries.len()) as u64)
    }
}
