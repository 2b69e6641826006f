//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WIKICACHE_*)
//! 2. TOML config file (if WIKICACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which store backs the summary cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// SQLite file at `db_path`.
    Sqlite,
    /// Process-local map; entries are lost on restart.
    Memory,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WIKICACHE_*)
/// 2. TOML config file (if WIKICACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    ///
    /// Set via WIKICACHE_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path to SQLite cache database.
    ///
    /// Set via WIKICACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Cache backend: "sqlite" (default) or "memory".
    ///
    /// Set via WIKICACHE_CACHE_BACKEND environment variable.
    #[serde(default = "default_cache_backend")]
    pub cache_backend: CacheBackend,

    /// Lifetime of a cached summary in seconds.
    ///
    /// Set via WIKICACHE_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Time bound for a single cache read or write, in milliseconds.
    ///
    /// Set via WIKICACHE_CACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    /// Interval between sweeps of expired entries. 0 disables the sweep.
    ///
    /// Set via WIKICACHE_PURGE_INTERVAL_SECS environment variable.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,

    /// Base URL of the summary API; `/page/summary/{term}` is appended.
    ///
    /// Set via WIKICACHE_UPSTREAM_BASE_URL environment variable.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// User-Agent string for upstream requests.
    ///
    /// Set via WIKICACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via WIKICACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whole-request timeout at the HTTP layer, in milliseconds.
    ///
    /// Set via WIKICACHE_REQUEST_TIMEOUT_MS environment variable.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether a not-found lookup is retried with a spelling correction.
    ///
    /// Set via WIKICACHE_CORRECTION_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub correction_enabled: bool,

    /// Maximum edit distance the spelling corrector considers.
    ///
    /// Set via WIKICACHE_MAX_EDIT_DISTANCE environment variable.
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,

    /// Frequency dictionary to load instead of the bundled one.
    ///
    /// Set via WIKICACHE_DICTIONARY_PATH environment variable.
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,

    /// Directory served under `/static`. Unset serves the stylesheet shipped
    /// with the server.
    ///
    /// Set via WIKICACHE_STATIC_DIR environment variable.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wikicache.sqlite")
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Sqlite
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_timeout_ms() -> u64 {
    2_000
}

fn default_purge_interval_secs() -> u64 {
    600
}

fn default_upstream_base_url() -> String {
    "https://en.wikipedia.org/api/rest_v1".into()
}

fn default_user_agent() -> String {
    "wikicache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_true() -> bool {
    true
}

fn default_max_edit_distance() -> usize {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            db_path: default_db_path(),
            cache_backend: default_cache_backend(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_timeout_ms: default_cache_timeout_ms(),
            purge_interval_secs: default_purge_interval_secs(),
            upstream_base_url: default_upstream_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            correction_enabled: true,
            max_edit_distance: default_max_edit_distance(),
            dictionary_path: None,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Upstream timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Sweep interval, or `None` when the sweep is disabled.
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_secs > 0).then(|| Duration::from_secs(self.purge_interval_secs))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WIKICACHE_`
    /// 2. TOML file from `WIKICACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment `load` extracts from.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WIKICACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("WIKICACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
