//! Query resolution: validate, normalize, probe the cache, fetch, and retry
//! once with a spelling correction.
//!
//! Successful fetches are cached under the canonical key of the query the
//! user typed, so a misspelling that was corrected once is a cache hit the
//! next time. Cache failures never fail a lookup; they are logged and the
//! cache is skipped for that request.

use std::sync::Arc;
use std::time::Duration;

use wikicache_core::{CanonicalTerm, Error, QueryIssue, SummaryCache, SummaryRecord, normalize};

use crate::spell::SpellCorrector;
use crate::summary::{SummaryError, SummaryFetcher};

/// How a resolved record was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Served from the cache without contacting the upstream.
    Cache,
    /// Fetched for the query as given.
    Upstream,
    /// Fetched for the spelling-corrected query.
    Corrected { corrected_query: String },
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub record: SummaryRecord,
    /// Canonical key of the query as given.
    pub key: CanonicalTerm,
    pub source: Source,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Lifetime of entries written to the cache.
    pub ttl: Duration,
    /// Bound on a single cache read or write.
    pub cache_timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(3600), cache_timeout: Duration::from_secs(2) }
    }
}

impl ResolverOptions {
    pub fn from_app(config: &wikicache_core::AppConfig) -> Self {
        Self { ttl: config.cache_ttl(), cache_timeout: config.cache_timeout() }
    }
}

/// Composes the cache, the upstream fetcher, and the optional corrector.
#[derive(Clone)]
pub struct Resolver {
    cache: Arc<dyn SummaryCache>,
    fetcher: Arc<dyn SummaryFetcher>,
    corrector: Option<Arc<SpellCorrector>>,
    options: ResolverOptions,
}

impl Resolver {
    /// `corrector: None` disables the correction retry.
    pub fn new(
        cache: Arc<dyn SummaryCache>, fetcher: Arc<dyn SummaryFetcher>, corrector: Option<Arc<SpellCorrector>>,
        options: ResolverOptions,
    ) -> Self {
        Self { cache, fetcher, corrector, options }
    }

    /// Resolve a raw query to a summary record.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidQuery` when `raw` is `None` or empty
    /// - `Error::NotFound` when neither the query nor its correction exists upstream
    /// - `Error::Upstream` for any other upstream failure
    pub async fn resolve(&self, raw: Option<&str>) -> Result<Resolved, Error> {
        let raw = match raw {
            None => return Err(Error::InvalidQuery(QueryIssue::Missing)),
            Some("") => return Err(Error::InvalidQuery(QueryIssue::Empty)),
            Some(raw) => raw,
        };

        let key = normalize(raw);

        if let Some(record) = self.cache_get(&key).await {
            tracing::debug!("cache hit for {}", key);
            return Ok(Resolved { record, key, source: Source::Cache });
        }
        tracing::debug!("cache miss for {}", key);

        match self.fetcher.fetch(&key).await {
            Ok(record) => {
                self.cache_set(&key, &record).await;
                return Ok(Resolved { record, key, source: Source::Upstream });
            }
            Err(SummaryError::NotFound(_)) => {}
            Err(e) => {
                tracing::debug!(term = %key, error = %e, "upstream lookup failed");
                return Err(e.into());
            }
        }

        let Some(corrector) = &self.corrector else {
            return Err(Error::NotFound { term: key.to_string(), corrected: None });
        };

        let corrected_query = corrector.correct(raw);
        let corrected_key = normalize(&corrected_query);
        if corrected_key == key {
            tracing::debug!("no correction for {}", key);
            return Err(Error::NotFound { term: key.to_string(), corrected: None });
        }

        tracing::debug!(term = %key, corrected = %corrected_key, "retrying with spelling correction");

        match self.fetcher.fetch(&corrected_key).await {
            Ok(record) => {
                self.cache_set(&key, &record).await;
                Ok(Resolved { record, key, source: Source::Corrected { corrected_query } })
            }
            Err(SummaryError::NotFound(_)) => {
                Err(Error::NotFound { term: key.to_string(), corrected: Some(corrected_key.to_string()) })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn cache_get(&self, key: &CanonicalTerm) -> Option<SummaryRecord> {
        match tokio::time::timeout(self.options.cache_timeout, self.cache.get(key)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                tracing::warn!("cache read failed for {}: {}", key, e);
                None
            }
            Err(_) => {
                tracing::warn!("cache read timed out for {}", key);
                None
            }
        }
    }

    async fn cache_set(&self, key: &CanonicalTerm, record: &SummaryRecord) {
        match tokio::time::timeout(self.options.cache_timeout, self.cache.set(key, record, self.options.ttl)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("failed to cache summary for {}: {}", key, e),
            Err(_) => tracing::warn!("cache write timed out for {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use wikicache_core::MemoryCache;

    /// Serves records from a fixed map and counts calls.
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, SummaryRecord>,
        failing: bool,
        /// Terms answered with a 503 instead of a lookup.
        unavailable: HashSet<String>,
        calls: AtomicUsize,
        requested: std::sync::Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with_page(mut self, key: &str, record: SummaryRecord) -> Self {
            self.pages.insert(key.to_string(), record);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SummaryFetcher for StubFetcher {
        async fn fetch(&self, term: &CanonicalTerm) -> Result<SummaryRecord, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(term.to_string());
            if self.failing || self.unavailable.contains(term.as_str()) {
                return Err(SummaryError::HttpError { status: 503 });
            }
            self.pages.get(term.as_str()).cloned().ok_or_else(|| SummaryError::NotFound(term.to_string()))
        }
    }

    /// A cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl SummaryCache for BrokenCache {
        async fn get(&self, _key: &CanonicalTerm) -> Result<Option<SummaryRecord>, Error> {
            Err(Error::Serialization(serde_json::Error::io(std::io::Error::other("down"))))
        }

        async fn set(&self, _key: &CanonicalTerm, _record: &SummaryRecord, _ttl: Duration) -> Result<(), Error> {
            Err(Error::MigrationFailed("down".into()))
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            Ok(0)
        }
    }

    /// A cache that never answers.
    struct StalledCache;

    #[async_trait]
    impl SummaryCache for StalledCache {
        async fn get(&self, _key: &CanonicalTerm) -> Result<Option<SummaryRecord>, Error> {
            std::future::pending().await
        }

        async fn set(&self, _key: &CanonicalTerm, _record: &SummaryRecord, _ttl: Duration) -> Result<(), Error> {
            std::future::pending().await
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            Ok(0)
        }
    }

    fn einstein() -> SummaryRecord {
        SummaryRecord::new(
            "Albert Einstein",
            "Albert Einstein was a German-born theoretical physicist.",
            "https://en.wikipedia.org/wiki/Albert_Einstein",
        )
    }

    fn corrector() -> Arc<SpellCorrector> {
        Arc::new(SpellCorrector::from_entries([("albert", 4_500_000), ("einstein", 2_500_000), ("the", 23_000_000)], 2))
    }

    fn resolver(
        cache: Arc<dyn SummaryCache>, fetcher: Arc<StubFetcher>, corrector: Option<Arc<SpellCorrector>>,
    ) -> Resolver {
        let options = ResolverOptions { ttl: Duration::from_secs(3600), cache_timeout: Duration::from_millis(100) };
        Resolver::new(cache, fetcher, corrector, options)
    }

    #[tokio::test]
    async fn test_missing_and_empty_query() {
        let fetcher = Arc::new(StubFetcher::default());
        let resolver = resolver(Arc::new(MemoryCache::new()), fetcher.clone(), Some(corrector()));

        assert!(matches!(resolver.resolve(None).await, Err(Error::InvalidQuery(QueryIssue::Missing))));
        assert!(matches!(resolver.resolve(Some("")).await, Err(Error::InvalidQuery(QueryIssue::Empty))));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_then_cache_hit() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::default().with_page("Albert_Einstein", einstein()));
        let resolver = resolver(cache.clone(), fetcher.clone(), Some(corrector()));

        let first = resolver.resolve(Some("albert einstein")).await.unwrap();
        assert_eq!(first.key.as_str(), "Albert_Einstein");
        assert_eq!(first.source, Source::Upstream);
        assert_eq!(first.record, einstein());
        assert_eq!(fetcher.calls(), 1);

        let second = resolver.resolve(Some("albert einstein")).await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.record, einstein());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_cached_key_skips_fetcher() {
        let cache = Arc::new(MemoryCache::new());
        cache.set(&normalize("albert einstein"), &einstein(), Duration::from_secs(60)).await.unwrap();

        let fetcher = Arc::new(StubFetcher::default());
        let resolver = resolver(cache, fetcher.clone(), Some(corrector()));

        let resolved = resolver.resolve(Some("ALBERT EINSTEIN")).await.unwrap();
        assert_eq!(resolved.source, Source::Cache);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_correction_cached_under_original_key() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::default().with_page("Albert_Einstein", einstein()));
        let resolver = resolver(cache.clone(), fetcher.clone(), Some(corrector()));

        let resolved = resolver.resolve(Some("albert einstien")).await.unwrap();
        assert_eq!(resolved.record, einstein());
        assert_eq!(resolved.key.as_str(), "Albert_Einstien");
        assert_eq!(resolved.source, Source::Corrected { corrected_query: "albert einstein".into() });
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["Albert_Einstien", "Albert_Einstein"]);

        assert_eq!(cache.get(&normalize("albert einstien")).await.unwrap(), Some(einstein()));
        assert!(cache.get(&normalize("albert einstein")).await.unwrap().is_none());

        let again = resolver.resolve(Some("albert einstien")).await.unwrap();
        assert_eq!(again.source, Source::Cache);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_double_miss_writes_nothing() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::default());
        let resolver = resolver(cache.clone(), fetcher.clone(), Some(corrector()));

        let result = resolver.resolve(Some("albert einstien")).await;
        match result {
            Err(Error::NotFound { term, corrected }) => {
                assert_eq!(term, "Albert_Einstien");
                assert_eq!(corrected.as_deref(), Some("Albert_Einstein"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(fetcher.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unchanged_correction_skips_second_fetch() {
        let fetcher = Arc::new(StubFetcher::default());
        let resolver = resolver(Arc::new(MemoryCache::new()), fetcher.clone(), Some(corrector()));

        let result = resolver.resolve(Some("zzqxv")).await;
        assert!(matches!(result, Err(Error::NotFound { corrected: None, .. })));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_correction_disabled() {
        let fetcher = Arc::new(StubFetcher::default().with_page("Albert_Einstein", einstein()));
        let resolver = resolver(Arc::new(MemoryCache::new()), fetcher.clone(), None);

        let result = resolver.resolve(Some("albert einstien")).await;
        assert!(matches!(result, Err(Error::NotFound { corrected: None, .. })));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher { failing: true, ..Default::default() });
        let resolver = resolver(cache.clone(), fetcher.clone(), Some(corrector()));

        let result = resolver.resolve(Some("albert einstien")).await;
        assert!(matches!(result, Err(Error::Upstream(_))));
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrected_fetch_failure_is_upstream() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher {
            unavailable: HashSet::from(["Albert_Einstein".to_string()]),
            ..Default::default()
        });
        let resolver = resolver(cache.clone(), fetcher.clone(), Some(corrector()));

        let result = resolver.resolve(Some("albert einstien")).await;
        assert!(matches!(result, Err(Error::Upstream(_))), "{result:?}");
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["Albert_Einstien", "Albert_Einstein"]);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_whitespace_query_is_looked_up() {
        let fetcher = Arc::new(StubFetcher::default());
        let resolver = resolver(Arc::new(MemoryCache::new()), fetcher.clone(), Some(corrector()));

        let result = resolver.resolve(Some("   ")).await;
        assert!(matches!(result, Err(Error::NotFound { corrected: None, .. })), "{result:?}");
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["___"]);
    }

    #[tokio::test]
    async fn test_broken_cache_is_bypassed() {
        let fetcher = Arc::new(StubFetcher::default().with_page("Albert_Einstein", einstein()));
        let resolver = resolver(Arc::new(BrokenCache), fetcher.clone(), Some(corrector()));

        let resolved = resolver.resolve(Some("albert einstein")).await.unwrap();
        assert_eq!(resolved.source, Source::Upstream);

        let resolved = resolver.resolve(Some("albert einstein")).await.unwrap();
        assert_eq!(resolved.source, Source::Upstream);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_stalled_cache_times_out() {
        let fetcher = Arc::new(StubFetcher::default().with_page("Albert_Einstein", einstein()));
        let resolver = resolver(Arc::new(StalledCache), fetcher.clone(), None);

        let resolved = resolver.resolve(Some("albert einstein")).await.unwrap();
        assert_eq!(resolved.record, einstein());
        assert_eq!(fetcher.calls(), 1);
    }
}
