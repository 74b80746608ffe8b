//! User-facing notifications
//!
//! The download engine reports every terminal state through a [`Notifier`]:
//! one `success` per completed download, one `warning` per skipped file or
//! directory, one `error` per fatal failure.

use crate::downloader::ErrorKind;
use tracing::{error, info, warn};

/// Receiver of download notifications
pub trait Notifier: Send + Sync {
    /// Download finished and the archive was offered
    fn success(&self, message: &str);

    /// A file or directory was skipped; the walk continues
    fn warning(&self, message: &str);

    /// Download aborted
    fn error(&self, message: &str, kind: ErrorKind);

    /// Informational status (walk started, archive size, ...)
    fn info(&self, _message: &str) {}
}

/// Notifier that forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(target: "gitget::notify", "{message}");
    }

    fn warning(&self, message: &str) {
        warn!(target: "gitget::notify", "{message}");
    }

    fn error(&self, message: &str, kind: ErrorKind) {
        error!(target: "gitget::notify", code = kind.code(), "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "gitget::notify", "{message}");
    }
}
