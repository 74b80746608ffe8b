//! Remote content fetching
//!
//! The walker only needs two primitives from the remote side: list a
//! directory and download a file's bytes. [`ContentFetcher`] captures them so
//! the GitHub HTTP client and in-memory test doubles are interchangeable.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

pub mod github_http;
pub mod parser;
pub mod shared_resources;

pub use github_http::{ClientConfig, GithubHttpClient};

/// Category of a network failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Server answered with a non-success HTTP status
    Status,
    /// Connection, TLS or body transfer failure
    Transport,
    /// Request exceeded the configured timeout
    Timeout,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkErrorKind::Status => "status",
            NetworkErrorKind::Transport => "transport",
            NetworkErrorKind::Timeout => "timeout",
        };
        write!(f, "{s}")
    }
}

/// Fetcher errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FetcherError {
    /// Non-success status or transport failure
    #[error("network error ({kind}{}): {message}", .status.map(|s| format!(", HTTP {s}")).unwrap_or_default())]
    Network {
        /// HTTP status when the server answered
        status: Option<u16>,
        /// Failure category
        kind: NetworkErrorKind,
        /// Human-readable detail
        message: String,
    },

    /// Response body could not be interpreted as a contents listing
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetcherError {
    /// Error for a non-success HTTP status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status: Some(status),
            kind: NetworkErrorKind::Status,
            message: message.into(),
        }
    }

    /// Error for a transport-level failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            kind: NetworkErrorKind::Transport,
            message: message.into(),
        }
    }

    /// Error for a timed-out request
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            kind: NetworkErrorKind::Timeout,
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetcherError::Network { status, .. } => *status,
            FetcherError::InvalidResponse(_) => None,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Kind of a listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory that can be listed further
    Directory,
    /// Anything else the API reports (symlink, submodule, ...)
    Other(String),
}

impl EntryKind {
    /// Map the contents-API `type` field
    pub fn from_api_type(value: &str) -> Self {
        match value {
            "file" => EntryKind::File,
            "dir" => EntryKind::Directory,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

/// One item of a directory listing.
///
/// `path` is relative to the walk root, slash-joined. The fetcher fills it
/// with the bare name; the walker rebases it under the parent directory with
/// [`Entry::under`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name (last path component)
    pub name: String,
    /// File, directory or other
    pub kind: EntryKind,
    /// Relative path from the walk root
    pub path: String,
    /// Raw content URL (files only)
    pub download_url: Option<String>,
    /// Contents-API URL listing this directory (directories only)
    pub listing_url: Option<String>,
}

impl Entry {
    /// File entry
    pub fn file(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            kind: EntryKind::File,
            download_url: Some(download_url.into()),
            listing_url: None,
        }
    }

    /// Directory entry
    pub fn directory(name: impl Into<String>, listing_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            kind: EntryKind::Directory,
            download_url: None,
            listing_url: Some(listing_url.into()),
        }
    }

    /// Re-root this entry under `parent` (empty parent keeps the name as path)
    pub fn under(mut self, parent: &str) -> Self {
        self.path = if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{parent}/{}", self.name)
        };
        self
    }
}

/// The two remote primitives needed to walk a repository tree.
///
/// Implementations must be safe to call concurrently; each call performs its
/// own rate-limiter acquisition and its own request.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// List the entries of the directory at `url`
    async fn list_directory(&self, url: &str) -> FetcherResult<Vec<Entry>>;

    /// Download the raw bytes of the file at `url`
    async fn download_file(&self, url: &str) -> FetcherResult<Bytes>;
}
