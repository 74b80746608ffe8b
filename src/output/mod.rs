//! Archive delivery
//!
//! The engine hands the finished zip blob to a [`DownloadTrigger`]. The CLI
//! uses [`SaveToDirectory`], which behaves like a browser download: it never
//! overwrites and picks `name (1).zip`, `name (2).zip`, ... on collision.

use bytes::Bytes;
use std::fs::OpenOptions;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Highest collision suffix tried before giving up
const MAX_COLLISION_SUFFIX: u32 = 9999;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error writing {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Suggested filename is empty or contains a path separator
    #[error("invalid filename '{0}'")]
    InvalidFilename(String),

    /// Every candidate name is taken
    #[error("no free filename for '{0}'")]
    NoFreeName(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the finished archive
pub trait DownloadTrigger: Send + Sync {
    /// Offer `blob` for saving under `suggested_filename`
    fn offer(&self, blob: Bytes, suggested_filename: &str) -> OutputResult<()>;
}

/// Saves archives into a directory without overwriting existing files
#[derive(Debug)]
pub struct SaveToDirectory {
    dir: PathBuf,
    saved: Mutex<Vec<PathBuf>>,
}

impl SaveToDirectory {
    /// Save into `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Paths written so far, in order
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Write `blob` to the first free candidate name and return its path
    pub fn save(&self, blob: &[u8], suggested_filename: &str) -> OutputResult<PathBuf> {
        validate_filename(suggested_filename)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| OutputError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for n in 0..=MAX_COLLISION_SUFFIX {
            let path = self.dir.join(candidate_name(suggested_filename, n));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => continue,
                Err(source) => return Err(OutputError::Io { path, source }),
            };

            file.write_all(blob)
                .and_then(|_| file.sync_all())
                .map_err(|source| OutputError::Io {
                    path: path.clone(),
                    source,
                })?;

            info!(path = %path.display(), bytes = blob.len(), "Archive saved");
            if let Ok(mut saved) = self.saved.lock() {
                saved.push(path.clone());
            }
            return Ok(path);
        }

        Err(OutputError::NoFreeName(suggested_filename.to_string()))
    }
}

impl DownloadTrigger for SaveToDirectory {
    fn offer(&self, blob: Bytes, suggested_filename: &str) -> OutputResult<()> {
        self.save(&blob, suggested_filename).map(|_| ())
    }
}

fn validate_filename(name: &str) -> OutputResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(OutputError::InvalidFilename(name.to_string()));
    }
    Ok(())
}

/// `name.zip` for n = 0, else `name (n).zip`
fn candidate_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }

    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{filename} ({n})"),
    }
}
