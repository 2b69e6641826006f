//! Time-bounded cache for summary records.
//!
//! Entries are keyed by canonical term and expire after their TTL. Two backends
//! implement [`SummaryCache`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, versioned migrations
//! - [`MemoryCache`]: process-local map, for tests and throwaway deployments

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod summaries;

use std::time::Duration;

use async_trait::async_trait;

pub use crate::Error;
use crate::{CanonicalTerm, SummaryRecord};

pub use connection::CacheDb;
pub use memory::MemoryCache;

/// Get / set-with-expiry access to cached summaries.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    /// Read an unexpired entry. Expired entries read as `None`.
    async fn get(&self, key: &CanonicalTerm) -> Result<Option<SummaryRecord>, Error>;

    /// Write an entry, replacing any previous value under the same key.
    async fn set(&self, key: &CanonicalTerm, record: &SummaryRecord, ttl: Duration) -> Result<(), Error>;

    /// Remove expired entries, returning how many were deleted.
    async fn purge_expired(&self) -> Result<u64, Error>;
}
