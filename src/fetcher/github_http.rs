//! GitHub contents-API client
//!
//! Implements [`ContentFetcher`] over reqwest. Every request first takes its
//! slot from the shared [`RateLimiter`]. Failures are returned as
//! [`FetcherError`] values; nothing is retried here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::downloader::config::{DEFAULT_API_BASE, MIN_REQUEST_INTERVAL_MS};
use crate::downloader::rate_limit::RateLimiter;
use crate::fetcher::parser::ContentsParser;
use crate::fetcher::shared_resources::{
    build_http_client, global_github_rate_limiter, global_http_client, USER_AGENT,
};
use crate::fetcher::{ContentFetcher, Entry, FetcherError, FetcherResult};
use crate::metrics::{self, HttpRequestMetrics};

const GITHUB_JSON: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Settings for a dedicated [`GithubHttpClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Contents-API base (`https://api.github.com/repos`)
    pub api_base: String,
    /// User agent header value
    pub user_agent: String,
    /// Minimum spacing between request starts
    pub min_request_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            min_request_interval: Duration::from_millis(MIN_REQUEST_INTERVAL_MS),
        }
    }
}

/// HTTP client for the GitHub contents API
pub struct GithubHttpClient {
    client: Arc<Client>,
    rate_limiter: Arc<RateLimiter>,
    api_base: String,
}

impl GithubHttpClient {
    /// Create a client from explicit parts
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client
    /// * `rate_limiter` - Pacing gate; share one per process
    /// * `api_base` - Contents-API base URL
    pub fn new(
        client: Arc<Client>,
        rate_limiter: Arc<RateLimiter>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            api_base: api_base.into(),
        }
    }

    /// Client on the process-wide HTTP client and rate limiter
    pub fn shared() -> Self {
        Self::new(
            global_http_client(),
            global_github_rate_limiter(),
            DEFAULT_API_BASE,
        )
    }

    /// Client with its own HTTP client and rate limiter built from `config`
    pub fn from_config(config: &ClientConfig) -> FetcherResult<Self> {
        let client = build_http_client(&config.user_agent)
            .map_err(|e| FetcherError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(RateLimiter::new(config.min_request_interval)),
            config.api_base.clone(),
        ))
    }

    /// Contents-API base URL used to resolve repository references
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Rate limiter this client paces through
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Paced GET returning a successful response
    async fn get(&self, url: &str, operation: &'static str, accept: Option<&str>) -> FetcherResult<Response> {
        let waited = self.rate_limiter.acquire().await;
        metrics::record_rate_limit_wait(waited);
        if !waited.is_zero() {
            debug!(waited_ms = waited.as_millis() as u64, "Rate limiter delayed request");
        }

        debug!(url, operation, "Sending GET request");
        let request_metrics = HttpRequestMetrics::start(operation);

        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                request_metrics.record_network_error();
                return Err(map_reqwest_error(&e));
            }
        };

        let status = response.status();
        request_metrics.record_status(status.as_u16());

        let remaining = self.parse_rate_limit_remaining(response.headers());
        if let Some(remaining) = remaining {
            metrics::record_rate_limit_remaining(remaining);
        }

        if status.is_success() {
            return Ok(response);
        }

        let reset = response
            .headers()
            .get(RATE_LIMIT_RESET)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        let message = if matches!(status.as_u16(), 403 | 429) && remaining == Some(0) {
            match reset {
                Some(reset) => format!("GitHub API rate limit exceeded (resets at {reset})"),
                None => "GitHub API rate limit exceeded".to_string(),
            }
        } else {
            error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string())
        };

        warn!(url, status = status.as_u16(), %message, "GitHub request failed");
        Err(FetcherError::status(status.as_u16(), message))
    }

    /// Parse the `x-ratelimit-remaining` header
    ///
    /// # Returns
    /// Some(remaining) if the header is present and numeric, None otherwise
    fn parse_rate_limit_remaining(&self, headers: &HeaderMap) -> Option<u32> {
        let raw = headers.get(RATE_LIMIT_REMAINING)?.to_str().ok()?;
        match raw.parse::<u32>() {
            Ok(remaining) => {
                debug!(remaining, "GitHub rate limit remaining");
                Some(remaining)
            }
            Err(e) => {
                warn!("Failed to parse rate limit header '{}': {}", raw, e);
                None
            }
        }
    }
}

#[async_trait]
impl ContentFetcher for GithubHttpClient {
    async fn list_directory(&self, url: &str) -> FetcherResult<Vec<Entry>> {
        let response = self.get(url, "list", Some(GITHUB_JSON)).await?;
        let body = response.bytes().await.map_err(|e| map_reqwest_error(&e))?;
        let entries = ContentsParser::parse_listing(&body)?;
        debug!(url, entries = entries.len(), "Listed directory");
        Ok(entries)
    }

    async fn download_file(&self, url: &str) -> FetcherResult<Bytes> {
        let response = self.get(url, "download", None).await?;
        let bytes = response.bytes().await.map_err(|e| map_reqwest_error(&e))?;
        debug!(url, bytes = bytes.len(), "Downloaded file");
        Ok(bytes)
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> FetcherError {
    if error.is_timeout() {
        FetcherError::timeout(error.to_string())
    } else {
        FetcherError::transport(error.to_string())
    }
}

/// Extract `message` from a GitHub JSON error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
