//! CLI error types and conversions

use crate::downloader::DownloadError;
use crate::fetcher::FetcherError;
use crate::metrics::MetricsError;
use crate::resolver::ResolveError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Download failed
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),

    /// URL could not be resolved
    #[error(transparent)]
    ResolveError(#[from] ResolveError),

    /// HTTP client setup failed
    #[error("client error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Metrics exporter setup failed
    #[error("metrics error: {0}")]
    MetricsError(#[from] MetricsError),
}
