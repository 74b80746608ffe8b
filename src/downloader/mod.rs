//! Download orchestration
//!
//! Turns a GitHub folder URL into a zip archive:
//!
//! 1. **Resolve**: [`crate::resolver::RepoRef`] parses the URL
//! 2. **Walk**: [`walker::TreeWalker`] expands the tree with bounded
//!    concurrency, pacing every request through [`rate_limit::RateLimiter`]
//! 3. **Archive**: files land in a [`crate::archive::ArchiveBuilder`]
//! 4. **Deliver**: [`executor::DownloadExecutor`] finalizes the archive and
//!    offers it to a [`crate::output::DownloadTrigger`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitget::downloader::{DownloadExecutor, WalkConfig};
//! use gitget::fetcher::GithubHttpClient;
//! use gitget::notify::LogNotifier;
//! use gitget::output::SaveToDirectory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GithubHttpClient::shared();
//! let api_base = client.api_base().to_string();
//! let executor = DownloadExecutor::new(Arc::new(client), api_base, WalkConfig::default());
//!
//! let summary = executor
//!     .execute(
//!         "https://github.com/rust-lang/rust/tree/main/src/doc",
//!         &LogNotifier,
//!         &SaveToDirectory::new("."),
//!     )
//!     .await?;
//! println!("{} files in {}", summary.files_written, summary.filename);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Per-item failures (one file, one subdirectory) become warnings and the
//! walk continues. Everything else ends the download with a [`DownloadError`]
//! whose [`ErrorKind`] is reported to the notifier exactly once.

pub mod config;
pub mod executor;
pub mod job;
pub mod progress;
pub mod rate_limit;
pub mod walker;

use std::fmt;

use crate::archive::ArchiveError;
use crate::fetcher::FetcherError;
use crate::output::OutputError;
use crate::resolver::ResolveError;

pub use config::WalkConfig;
pub use executor::DownloadExecutor;
pub use job::{DownloadJob, DownloadSummary};
pub use rate_limit::RateLimiter;
pub use walker::{TreeWalker, WalkOutcome, WalkWarning};

/// User-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// URL is not a supported GitHub repository URL
    InvalidUrl,
    /// Root listing could not be fetched
    Network,
    /// Zip generation failed
    Archive,
    /// Anything else
    Unknown,
    /// Download was cancelled
    Cancelled,
}

impl ErrorKind {
    /// Stable code shown alongside error notifications
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "INVALID__URL__SYNTAX",
            ErrorKind::Network => "CONNECTION__ERROR",
            ErrorKind::Archive => "ZIP__GENERATION__FAILURE",
            ErrorKind::Unknown => "UNKNOWN__ERROR",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fatal download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// URL could not be resolved
    #[error(transparent)]
    InvalidUrl(#[from] ResolveError),

    /// Root listing fetch failed; nothing to archive
    #[error("failed to fetch folder contents from {url}: {source}")]
    RootListing {
        /// Contents-API URL of the root
        url: String,
        /// Fetch failure
        source: FetcherError,
    },

    /// Zip generation failed
    #[error("error generating zip file: {0}")]
    Archive(#[from] ArchiveError),

    /// Archive could not be delivered
    #[error("failed to save archive: {0}")]
    Output(#[from] OutputError),

    /// Cancelled before completion
    #[error("download cancelled")]
    Cancelled,

    /// Unexpected orchestration failure
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl DownloadError {
    /// Taxonomy entry for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            DownloadError::RootListing { .. } => ErrorKind::Network,
            DownloadError::Archive(_) => ErrorKind::Archive,
            DownloadError::Output(_) | DownloadError::Unknown(_) => ErrorKind::Unknown,
            DownloadError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
