//! Download configuration constants and walk settings

use std::time::Duration;

/// Minimum spacing between the starts of two outbound requests.
/// Unauthenticated GitHub clients get 60 requests per hour per IP; one
/// request per second keeps short walks smooth without promising to stay
/// under that quota on large trees.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

/// Default bound on concurrently in-flight file downloads.
pub const DEFAULT_FILE_CONCURRENCY: usize = 4;

/// Default bound on concurrently in-flight directory listings.
pub const DEFAULT_LISTING_CONCURRENCY: usize = 4;

/// Upper limit accepted for either concurrency bound.
pub const MAX_CONCURRENCY: usize = 32;

/// Base of the GitHub contents API (`<base>/<owner>/<repo>/contents/<path>`).
pub const DEFAULT_API_BASE: &str = "https://api.github.com/repos";

/// Base URL used for shareable download links.
pub const DEFAULT_SHARE_BASE: &str = "https://githives.com/";

/// HTTP connect timeout (seconds)
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds), covering the whole request including body
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum interval between periodic progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Settings for one tree walk.
///
/// Both concurrency bounds always lie in `1..=MAX_CONCURRENCY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkConfig {
    max_concurrent_files: usize,
    max_concurrent_listings: usize,
    progress_interval: Duration,
}

impl WalkConfig {
    /// Maximum number of file downloads in flight at once
    pub fn max_concurrent_files(&self) -> usize {
        self.max_concurrent_files
    }

    /// Maximum number of directory listings in flight at once
    pub fn max_concurrent_listings(&self) -> usize {
        self.max_concurrent_listings
    }

    /// Minimum interval between progress log lines
    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
    }

    /// Set the file download bound (clamped to `1..=MAX_CONCURRENCY`)
    pub fn with_max_concurrent_files(mut self, value: usize) -> Self {
        self.max_concurrent_files = value.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the directory listing bound (clamped to `1..=MAX_CONCURRENCY`)
    pub fn with_max_concurrent_listings(mut self, value: usize) -> Self {
        self.max_concurrent_listings = value.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the progress log interval
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: DEFAULT_FILE_CONCURRENCY,
            max_concurrent_listings: DEFAULT_LISTING_CONCURRENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}
