//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::{AppConfig, CacheBackend};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, ms: u64) -> Result<(), ConfigError> {
    if ms < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if ms > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `listen_addr` is not a socket address
    /// - `cache_ttl_secs` is 0 or longer than 30 days
    /// - any timeout is under 100ms or over 5 minutes
    /// - `upstream_base_url` is not an http(s) URL
    /// - `user_agent` is empty
    /// - `max_edit_distance` is outside 1..=3
    ///
    /// Returns `ConfigError::Missing` if the SQLite backend has no `db_path`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid("listen_addr", "must be a socket address such as 127.0.0.1:8000"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_ttl_secs > 30 * 24 * 60 * 60 {
            return Err(invalid("cache_ttl_secs", "must not exceed 30 days"));
        }

        check_timeout("cache_timeout_ms", self.cache_timeout_ms)?;
        check_timeout("timeout_ms", self.timeout_ms)?;
        check_timeout("request_timeout_ms", self.request_timeout_ms)?;

        match url::Url::parse(&self.upstream_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => return Err(invalid("upstream_base_url", "scheme must be http or https")),
            Err(_) => return Err(invalid("upstream_base_url", "must be an absolute URL")),
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !(1..=3).contains(&self.max_edit_distance) {
            return Err(invalid("max_edit_distance", "must be between 1 and 3"));
        }

        if self.cache_backend == CacheBackend::Sqlite && self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "db_path".into(),
                hint: "Set WIKICACHE_DB_PATH or WIKICACHE_CACHE_BACKEND=memory".into(),
            });
        }

        if self.request_timeout_ms < self.timeout_ms {
            tracing::warn!(
                request_timeout_ms = self.request_timeout_ms,
                timeout_ms = self.timeout_ms,
                "request_timeout_ms is shorter than the upstream timeout; \
                 slow lookups will be cut off at the HTTP layer"
            );
        }

        Ok(())
    }
}
