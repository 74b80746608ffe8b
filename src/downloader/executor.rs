//! Download executor
//!
//! Drives one download from URL to delivered archive: resolve, walk,
//! finalize, offer. Every terminal path reports to the notifier exactly once
//! (one success, or one error with its
//! [`ErrorKind`](crate::downloader::ErrorKind)) and clears the
//! downloading flag so the user can retry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

use crate::cancel::{self, SharedCancel};
use crate::downloader::config::WalkConfig;
use crate::downloader::job::{DownloadJob, DownloadSummary};
use crate::downloader::walker::{TreeWalker, WalkOutcome};
use crate::downloader::DownloadError;
use crate::fetcher::ContentFetcher;
use crate::metrics;
use crate::notify::Notifier;
use crate::output::DownloadTrigger;
use crate::resolver::RepoRef;

/// Executes downloads against one fetcher
pub struct DownloadExecutor {
    fetcher: Arc<dyn ContentFetcher>,
    api_base: String,
    config: WalkConfig,
    cancel: Option<SharedCancel>,
    active: Arc<AtomicUsize>,
}

/// Clears the downloading flag on every exit path
struct ActiveGuard {
    active: Arc<AtomicUsize>,
}

impl ActiveGuard {
    fn enter(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self {
            active: active.clone(),
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DownloadExecutor {
    /// Create an executor.
    ///
    /// Picks up the process-wide cancel token when one is registered.
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        api_base: impl Into<String>,
        config: WalkConfig,
    ) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            config,
            cancel: cancel::get_global_cancel(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Attach a cancel token.
    pub fn with_cancel(mut self, cancel: SharedCancel) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Walk configuration in use
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Whether a download is in flight
    pub fn is_downloading(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// Download the folder at `raw_url` and offer it as `<folder>.zip`.
    ///
    /// Per-item failures are reported through `notifier.warning` while the
    /// walk runs. On success exactly one `success` notification is sent; on a
    /// fatal error exactly one `error` notification is sent and nothing is
    /// offered.
    pub async fn execute(
        &self,
        raw_url: &str,
        notifier: &dyn Notifier,
        trigger: &dyn DownloadTrigger,
    ) -> Result<DownloadSummary, DownloadError> {
        let repo = match RepoRef::parse(raw_url) {
            Ok(repo) => repo,
            Err(e) => return Err(self.fail(e.into(), notifier)),
        };

        let job = DownloadJob::new(repo, &self.api_base);
        let _active = ActiveGuard::enter(&self.active);

        let span = info_span!(
            "walk",
            owner = job.repo.owner(),
            repo = job.repo.repo(),
            subpath = job.repo.subpath()
        );

        let result = self.run(&job, notifier, trigger).instrument(span).await;

        match result {
            Ok(summary) => {
                metrics::record_download_completed();

                let message = if summary.is_complete() {
                    format!(
                        "Files downloaded successfully: {} ({} files)",
                        summary.filename, summary.files_written
                    )
                } else {
                    format!(
                        "Files downloaded: {} ({} files, {} skipped)",
                        summary.filename,
                        summary.files_written,
                        summary.warnings.len()
                    )
                };
                info!(
                    filename = %summary.filename,
                    files = summary.files_written,
                    archive_bytes = summary.archive_bytes,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "Download complete"
                );
                notifier.success(&message);
                Ok(summary)
            }
            Err(e) => Err(self.fail(e, notifier)),
        }
    }

    async fn run(
        &self,
        job: &DownloadJob,
        notifier: &dyn Notifier,
        trigger: &dyn DownloadTrigger,
    ) -> Result<DownloadSummary, DownloadError> {
        let started = Instant::now();
        info!(url = %job.api_url, "Starting download");
        notifier.info(&format!("Downloading {}", job.repo));

        let mut walker = TreeWalker::new(self.fetcher.as_ref(), notifier, self.config.clone());
        if let Some(cancel) = &self.cancel {
            walker = walker.with_cancel(cancel.clone());
        }

        let WalkOutcome {
            mut archive,
            warnings,
            ..
        } = walker.walk(&job.api_url).await?;

        let files_written = archive.len();
        let bytes_written = archive.total_bytes();

        let blob = tokio::task::spawn_blocking(move || archive.finalize())
            .await
            .map_err(|e| DownloadError::Unknown(format!("archive task failed: {e}")))??;

        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(DownloadError::Cancelled);
        }

        let archive_bytes = blob.len();
        trigger.offer(blob, &job.filename)?;

        Ok(DownloadSummary {
            repo: job.repo.clone(),
            filename: job.filename.clone(),
            files_written,
            bytes_written,
            archive_bytes,
            warnings,
            elapsed: started.elapsed(),
        })
    }

    /// Report a fatal error once and hand it back
    fn fail(&self, err: DownloadError, notifier: &dyn Notifier) -> DownloadError {
        let kind = err.kind();
        error!(code = kind.code(), "Download failed: {}", err);
        metrics::record_download_failed(kind);
        notifier.error(&err.to_string(), kind);
        err
    }
}
