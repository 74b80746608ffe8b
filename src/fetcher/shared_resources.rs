//! Process-wide HTTP client and rate limiter
//!
//! GitHub's anonymous quota is counted per source IP, so every fetcher in the
//! process must draw from one pacing gate. Walks started concurrently share
//! these instances and nothing else.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::downloader::config::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};
use crate::downloader::rate_limit::RateLimiter;

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("gitget/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the crate's user agent and timeouts
pub fn build_http_client(user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .build()
}

/// Global HTTP client shared by all fetchers (connection pooling)
pub static GLOBAL_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    let client = build_http_client(USER_AGENT).unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default HTTP client");
        Client::new()
    });
    Arc::new(client)
});

/// Global GitHub request pacing gate (one request start per second)
pub static GLOBAL_GITHUB_RATE_LIMITER: Lazy<Arc<RateLimiter>> =
    Lazy::new(|| Arc::new(RateLimiter::default()));

/// Get the global HTTP client
pub fn global_http_client() -> Arc<Client> {
    GLOBAL_HTTP_CLIENT.clone()
}

/// Get the global GitHub rate limiter
pub fn global_github_rate_limiter() -> Arc<RateLimiter> {
    GLOBAL_GITHUB_RATE_LIMITER.clone()
}
