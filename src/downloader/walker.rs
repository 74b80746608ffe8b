//! Recursive tree walk into an in-memory archive.
//!
//! The walk is a single cooperative loop. Discovered entries go into two
//! pending queues (files, directories); the loop moves them into one
//! [`FuturesUnordered`] set while respecting a separate in-flight bound for
//! each kind, then handles completions one at a time: listings push their
//! children back into the queues, downloads are written into the archive.
//!
//! Every spawned item is counted in the walk state before it is queued and
//! released only after its completion has been handled, so the walk ends
//! exactly when the whole transitively discovered tree has settled.
//!
//! Failures below the root never abort the walk. They become
//! [`WalkWarning`]s, reported to the notifier as they happen.

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveBuilder, ArchivePath};
use crate::cancel::SharedCancel;
use crate::downloader::config::WalkConfig;
use crate::downloader::progress::WalkProgress;
use crate::downloader::DownloadError;
use crate::fetcher::{ContentFetcher, Entry, EntryKind, FetcherResult};
use crate::metrics;
use crate::notify::Notifier;

/// What a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningTarget {
    /// A file that could not be downloaded
    File,
    /// A directory whose listing could not be fetched
    Directory,
}

/// Non-fatal failure recorded during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkWarning {
    /// Path relative to the walk root
    pub path: String,
    /// File or directory
    pub target: WarningTarget,
    /// Failure detail
    pub message: String,
}

impl fmt::Display for WalkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            WarningTarget::File => {
                write!(f, "Error downloading file {}: {}", self.path, self.message)
            }
            WarningTarget::Directory => write!(
                f,
                "Directory contents for {} are unavailable: {}",
                self.path, self.message
            ),
        }
    }
}

/// Mutable state of one walk
#[derive(Debug)]
struct WalkState {
    archive: ArchiveBuilder,
    outstanding: usize,
    cancelled: bool,
    warnings: Vec<WalkWarning>,
    progress: WalkProgress,
}

impl WalkState {
    fn new(config: &WalkConfig) -> Self {
        Self {
            archive: ArchiveBuilder::new(),
            outstanding: 0,
            cancelled: false,
            warnings: Vec::new(),
            progress: WalkProgress::new(config.progress_interval()),
        }
    }

    fn into_outcome(self) -> WalkOutcome {
        WalkOutcome {
            archive: self.archive,
            warnings: self.warnings,
            progress: self.progress,
        }
    }
}

/// Result of a completed walk: the unfinalized archive plus what was skipped
#[derive(Debug)]
pub struct WalkOutcome {
    /// Archive holding every file that was downloaded
    pub archive: ArchiveBuilder,
    /// Per-item failures in the order they occurred
    pub warnings: Vec<WalkWarning>,
    /// Final counters
    pub progress: WalkProgress,
}

enum Completion {
    File {
        entry: Entry,
        result: FetcherResult<Bytes>,
    },
    Listing {
        entry: Entry,
        result: FetcherResult<Vec<Entry>>,
    },
}

/// Walks a repository tree through a [`ContentFetcher`]
pub struct TreeWalker<'a> {
    fetcher: &'a dyn ContentFetcher,
    notifier: &'a dyn Notifier,
    config: WalkConfig,
    cancel: Option<SharedCancel>,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker
    pub fn new(
        fetcher: &'a dyn ContentFetcher,
        notifier: &'a dyn Notifier,
        config: WalkConfig,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            config,
            cancel: None,
        }
    }

    /// Abort the walk when `cancel` fires
    pub fn with_cancel(mut self, cancel: SharedCancel) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Fetch the root listing at `root_url` and walk everything below it.
    ///
    /// # Errors
    /// [`DownloadError::RootListing`] when the root listing fails,
    /// [`DownloadError::Cancelled`] when cancelled.
    pub async fn walk(&self, root_url: &str) -> Result<WalkOutcome, DownloadError> {
        debug!(url = root_url, "Fetching root listing");

        let listing = tokio::select! {
            biased;
            _ = self.wait_cancelled() => return Err(DownloadError::Cancelled),
            result = self.fetcher.list_directory(root_url) => result,
        };
        let root = listing.map_err(|source| DownloadError::RootListing {
            url: root_url.to_string(),
            source,
        })?;

        info!(entries = root.len(), "Root listing fetched");
        self.walk_listing(root).await
    }

    /// Walk an already-fetched root listing.
    pub async fn walk_listing(&self, root: Vec<Entry>) -> Result<WalkOutcome, DownloadError> {
        let mut state = WalkState::new(&self.config);
        let mut pending_files: VecDeque<Entry> = VecDeque::new();
        let mut pending_dirs: VecDeque<Entry> = VecDeque::new();

        self.enqueue(&mut state, root, "", &mut pending_files, &mut pending_dirs);

        let mut in_flight: FuturesUnordered<BoxFuture<'_, Completion>> = FuturesUnordered::new();
        let mut files_in_flight = 0usize;
        let mut listings_in_flight = 0usize;

        while state.outstanding > 0 {
            if self.is_cancelled() {
                state.cancelled = true;
                break;
            }

            while files_in_flight < self.config.max_concurrent_files() {
                let Some(entry) = pending_files.pop_front() else { break };
                in_flight.push(self.download(entry));
                files_in_flight += 1;
            }
            while listings_in_flight < self.config.max_concurrent_listings() {
                let Some(entry) = pending_dirs.pop_front() else { break };
                in_flight.push(self.list(entry));
                listings_in_flight += 1;
            }

            let completion = tokio::select! {
                biased;
                _ = self.wait_cancelled() => {
                    state.cancelled = true;
                    break;
                }
                next = in_flight.next() => match next {
                    Some(completion) => completion,
                    None => {
                        return Err(DownloadError::Unknown(format!(
                            "walk stalled with {} outstanding items",
                            state.outstanding
                        )));
                    }
                },
            };

            match completion {
                Completion::File { entry, result } => {
                    files_in_flight -= 1;
                    self.handle_file(&mut state, entry, result)?;
                }
                Completion::Listing { entry, result } => {
                    listings_in_flight -= 1;
                    match result {
                        Ok(children) => {
                            debug!(path = %entry.path, entries = children.len(), "Directory listed");
                            self.enqueue(
                                &mut state,
                                children,
                                &entry.path,
                                &mut pending_files,
                                &mut pending_dirs,
                            );
                        }
                        Err(e) => {
                            self.record_warning(
                                &mut state,
                                entry.path,
                                WarningTarget::Directory,
                                e.to_string(),
                            );
                        }
                    }
                }
            }
            state.outstanding -= 1;

            if state.progress.should_emit_update() {
                info!("{}", state.progress.format_progress());
                state.progress.mark_emitted();
            }
        }

        if state.cancelled {
            warn!(
                outstanding = state.outstanding,
                files = state.archive.len(),
                "Walk cancelled"
            );
            return Err(DownloadError::Cancelled);
        }

        info!(
            files = state.archive.len(),
            bytes = state.archive.total_bytes(),
            warnings = state.warnings.len(),
            "Walk complete"
        );
        Ok(state.into_outcome())
    }

    /// Queue the entries of one listing, rebased under `parent`.
    ///
    /// Entries of other kinds are dropped without a trace; file and directory
    /// entries missing their URL are recorded as warnings.
    fn enqueue(
        &self,
        state: &mut WalkState,
        entries: Vec<Entry>,
        parent: &str,
        files: &mut VecDeque<Entry>,
        dirs: &mut VecDeque<Entry>,
    ) {
        let mut file_count = 0u64;

        for entry in entries {
            let entry = entry.under(parent);
            match entry.kind {
                EntryKind::File if entry.download_url.is_some() => {
                    file_count += 1;
                    state.outstanding += 1;
                    files.push_back(entry);
                }
                EntryKind::File => {
                    file_count += 1;
                    self.record_warning(
                        state,
                        entry.path,
                        WarningTarget::File,
                        "no download URL".to_string(),
                    );
                }
                EntryKind::Directory if entry.listing_url.is_some() => {
                    state.outstanding += 1;
                    dirs.push_back(entry);
                }
                EntryKind::Directory => {
                    self.record_warning(
                        state,
                        entry.path,
                        WarningTarget::Directory,
                        "no listing URL".to_string(),
                    );
                }
                EntryKind::Other(ref kind) => {
                    debug!(path = %entry.path, kind = %kind, "Skipping unsupported entry");
                }
            }
        }

        state.progress.record_listing(file_count);
    }

    fn handle_file(
        &self,
        state: &mut WalkState,
        entry: Entry,
        result: FetcherResult<Bytes>,
    ) -> Result<(), DownloadError> {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                self.record_warning(state, entry.path, WarningTarget::File, e.to_string());
                return Ok(());
            }
        };

        let path = match ArchivePath::new(&entry.path) {
            Ok(path) => path,
            Err(e) => {
                self.record_warning(state, entry.path, WarningTarget::File, e.to_string());
                return Ok(());
            }
        };

        let len = bytes.len();
        state.archive.add_file(path, bytes)?;
        state.progress.record_file(len as u64);
        metrics::record_file_written(len);
        debug!(path = %entry.path, bytes = len, "File archived");
        Ok(())
    }

    fn record_warning(
        &self,
        state: &mut WalkState,
        path: String,
        target: WarningTarget,
        message: String,
    ) {
        let warning = WalkWarning {
            path,
            target,
            message,
        };
        warn!(path = %warning.path, "{}", warning);
        metrics::record_walk_warning();
        self.notifier.warning(&warning.to_string());
        state.progress.record_warning(target == WarningTarget::File);
        state.warnings.push(warning);
    }

    fn download(&self, entry: Entry) -> BoxFuture<'a, Completion> {
        let fetcher = self.fetcher;
        async move {
            let result = match entry.download_url.as_deref() {
                Some(url) => fetcher.download_file(url).await,
                None => Ok(Bytes::new()),
            };
            Completion::File { entry, result }
        }
        .boxed()
    }

    fn list(&self, entry: Entry) -> BoxFuture<'a, Completion> {
        let fetcher = self.fetcher;
        async move {
            let result = match entry.listing_url.as_deref() {
                Some(url) => fetcher.list_directory(url).await,
                None => Ok(Vec::new()),
            };
            Completion::Listing { entry, result }
        }
        .boxed()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    async fn wait_cancelled(&self) {
        match &self.cancel {
            Some(cancel) => cancel.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    }
}
