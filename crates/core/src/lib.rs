//! Core types and shared functionality for wikicache.
//!
//! This crate provides:
//! - Query normalization into canonical cache keys
//! - The summary cache (SQLite and in-memory backends)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod summary;

pub use cache::{CacheDb, MemoryCache, SummaryCache};
pub use config::{AppConfig, CacheBackend, ConfigError};
pub use error::{Error, QueryIssue};
pub use key::{CanonicalTerm, normalize};
pub use summary::SummaryRecord;
