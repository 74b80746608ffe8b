//! Download job and summary

use std::time::Duration;

use crate::downloader::walker::WalkWarning;
use crate::resolver::RepoRef;

/// One resolved download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Repository reference parsed from the URL
    pub repo: RepoRef,
    /// Contents-API URL of the walk root
    pub api_url: String,
    /// Filename offered for the archive (`<folder>.zip`)
    pub filename: String,
}

impl DownloadJob {
    /// Build a job for `repo` against the contents-API base
    pub fn new(repo: RepoRef, api_base: &str) -> Self {
        Self {
            api_url: repo.api_url(api_base),
            filename: repo.archive_filename(),
            repo,
        }
    }
}

/// Result of a completed download
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    /// Downloaded repository reference
    pub repo: RepoRef,
    /// Filename the archive was offered under
    pub filename: String,
    /// Files in the archive
    pub files_written: usize,
    /// Uncompressed size of the archived files
    pub bytes_written: usize,
    /// Size of the zip blob
    pub archive_bytes: usize,
    /// Per-item failures, in the order they occurred
    pub warnings: Vec<WalkWarning>,
    /// Wall-clock duration of the download
    pub elapsed: Duration,
}

impl DownloadSummary {
    /// Whether every discovered item made it into the archive
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
