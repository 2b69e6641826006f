//! Encyclopedia summary API client.
//!
//! ### Protocol
//!
//! - **Endpoint**: `GET {base_url}/page/summary/{term}`, default base
//!   `https://en.wikipedia.org/api/rest_v1`
//! - **Redirects**: followed, up to 5 (the API redirects non-canonical titles)
//! - **Status mapping**: 404 is [`SummaryError::NotFound`]; any other non-2xx is
//!   [`SummaryError::HttpError`]
//! - **Payload**: `extract`, `content_urls.desktop.page` and `title` are all required

pub mod error;
pub mod response;

pub use error::SummaryError;
pub use response::PageSummaryResponse;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use wikicache_core::{CanonicalTerm, SummaryRecord};

/// Default base URL for the summary API.
const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "wikicache/0.1";

/// Anything that can turn a canonical term into a summary record.
#[async_trait]
pub trait SummaryFetcher: Send + Sync {
    async fn fetch(&self, term: &CanonicalTerm) -> Result<SummaryRecord, SummaryError>;
}

/// Summary client configuration.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Base URL (default: https://en.wikipedia.org/api/rest_v1).
    pub base_url: String,
    /// Request timeout (default: 5s).
    pub timeout: Duration,
    /// User-agent string (default: wikicache/0.1).
    pub user_agent: String,
    /// Maximum number of redirects to follow (default: 5).
    pub max_redirects: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
        }
    }
}

impl SummaryConfig {
    /// Build from the application configuration.
    pub fn from_app(config: &wikicache_core::AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        }
    }
}

/// HTTP client for the summary API.
#[derive(Debug, Clone)]
pub struct SummaryClient {
    http: reqwest::Client,
    config: SummaryConfig,
}

impl SummaryClient {
    /// Create a new summary client with the given configuration.
    pub fn new(config: SummaryConfig) -> Result<Self, SummaryError> {
        url::Url::parse(&config.base_url).map_err(|e| SummaryError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self { http, config })
    }

    /// The summary endpoint URL for a term.
    ///
    /// The term is already percent-encoded, so it is appended verbatim.
    pub fn summary_url(&self, term: &CanonicalTerm) -> String {
        format!("{}/page/summary/{}", self.config.base_url.trim_end_matches('/'), term)
    }

    /// Fetch and parse the summary for a canonical term.
    pub async fn summary(&self, term: &CanonicalTerm) -> Result<SummaryRecord, SummaryError> {
        let start = Instant::now();
        let url = self.summary_url(term);

        tracing::debug!("fetching summary: {}", url);

        let http_response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(term = %term, status = status.as_u16(), "summary API response");

        if status == StatusCode::NOT_FOUND {
            return Err(SummaryError::NotFound(term.to_string()));
        }

        if !status.is_success() {
            return Err(SummaryError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let payload: PageSummaryResponse =
            serde_json::from_slice(&bytes).map_err(|e| SummaryError::Parse(e.to_string()))?;
        let record = payload.into_record()?;

        tracing::debug!("summary for {} fetched in {:?}", term, start.elapsed());

        Ok(record)
    }
}

#[async_trait]
impl SummaryFetcher for SummaryClient {
    async fn fetch(&self, term: &CanonicalTerm) -> Result<SummaryRecord, SummaryError> {
        self.summary(term).await
    }
}
