//! In-memory zip archive builder
//!
//! Files are buffered by [`ArchivePath`] until [`ArchiveBuilder::finalize`]
//! compresses them into a single zip blob. Entries are kept in a sorted map,
//! so identical trees always produce the same entry order regardless of the
//! order in which downloads completed.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Write};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive errors
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// `add_file` or `finalize` called on a finalized builder
    #[error("archive already finalized")]
    Finalized,

    /// Path is empty, absolute or contains `.`/`..` components
    #[error("invalid archive path '{0}'")]
    InvalidPath(String),

    /// Compression failure
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Write into the in-memory buffer failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relative POSIX path of a file inside the archive (no leading slash)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Validate and normalize a slash-joined relative path.
    ///
    /// Leading slashes and empty segments are dropped; `.` and `..`
    /// segments are rejected.
    pub fn new(raw: &str) -> Result<Self, ArchiveError> {
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" => continue,
                "." | ".." => return Err(ArchiveError::InvalidPath(raw.to_string())),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(ArchiveError::InvalidPath(raw.to_string()));
        }

        Ok(Self(segments.join("/")))
    }

    /// Path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates files and produces one zip blob
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: BTreeMap<ArchivePath, Bytes>,
    total_bytes: usize,
    finalized: bool,
}

impl ArchiveBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// A second write to the same path replaces the first and logs a warning.
    ///
    /// # Errors
    /// [`ArchiveError::Finalized`] after [`finalize`](Self::finalize).
    pub fn add_file(&mut self, path: ArchivePath, bytes: Bytes) -> Result<(), ArchiveError> {
        if self.finalized {
            return Err(ArchiveError::Finalized);
        }

        self.total_bytes += bytes.len();
        if let Some(previous) = self.entries.insert(path.clone(), bytes) {
            self.total_bytes -= previous.len();
            warn!(path = %path, "Duplicate archive path, keeping the latest content");
        }
        Ok(())
    }

    /// Number of files added
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file has been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uncompressed size of all files
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Whether a path has been written
    pub fn contains(&self, path: &ArchivePath) -> bool {
        self.entries.contains_key(path)
    }

    /// Compress every buffered file into a zip blob.
    ///
    /// Consumes the buffered contents; the builder cannot be reused.
    pub fn finalize(&mut self) -> Result<Bytes, ArchiveError> {
        if self.finalized {
            return Err(ArchiveError::Finalized);
        }
        self.finalized = true;

        let entries = std::mem::take(&mut self.entries);
        let file_count = entries.len();
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(self.total_bytes / 2)));
        for (path, bytes) in entries {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&bytes)?;
        }
        let blob = zip.finish()?.into_inner();

        debug!(
            files = file_count,
            uncompressed = self.total_bytes,
            compressed = blob.len(),
            "Archive finalized"
        );
        Ok(Bytes::from(blob))
    }
}
