//! Progress tracking for tree walks.
//!
//! The total number of files is unknown up front: it grows as directories
//! are expanded. [`WalkProgress`] therefore reports completion against the
//! files discovered so far and emits a `[PROGRESS]` line either when the
//! update interval has elapsed or when completion advances by at least the
//! configured percentage step.

use std::time::{Duration, Instant};

use crate::downloader::config::DEFAULT_PROGRESS_INTERVAL;

const DEFAULT_PERCENTAGE_STEP: f64 = 10.0;

/// Progress state of one walk.
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Files discovered in listings so far.
    pub files_discovered: u64,
    /// Files written into the archive.
    pub files_written: u64,
    /// Directories listed successfully.
    pub directories_listed: u64,
    /// Files whose download failed.
    pub files_skipped: u64,
    /// Items skipped with a warning (files and directories).
    pub warnings: u64,
    /// Bytes written into the archive.
    pub bytes_written: u64,
    /// Timestamp when the walk started.
    pub start_time: Instant,
    /// Last time progress was reported.
    pub last_update: Instant,
    /// Minimum interval between time-triggered updates.
    pub update_interval: Duration,
    /// Last reported completion percentage (0-100).
    pub last_reported_percentage: f64,
    /// Minimum percentage delta required to emit a new update.
    pub min_percentage_step: f64,
}

impl WalkProgress {
    /// Create a tracker with the given update interval.
    pub fn new(update_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            files_discovered: 0,
            files_written: 0,
            directories_listed: 0,
            files_skipped: 0,
            warnings: 0,
            bytes_written: 0,
            start_time: now,
            last_update: now,
            update_interval,
            last_reported_percentage: 0.0,
            min_percentage_step: DEFAULT_PERCENTAGE_STEP,
        }
    }

    /// Record entries found in a listing.
    pub fn record_listing(&mut self, files: u64) {
        self.directories_listed = self.directories_listed.saturating_add(1);
        self.files_discovered = self.files_discovered.saturating_add(files);
    }

    /// Record a file written into the archive.
    pub fn record_file(&mut self, bytes: u64) {
        self.files_written = self.files_written.saturating_add(1);
        self.bytes_written = self.bytes_written.saturating_add(bytes);
    }

    /// Record a skipped item.
    pub fn record_warning(&mut self, is_file: bool) {
        self.warnings = self.warnings.saturating_add(1);
        if is_file {
            self.files_skipped = self.files_skipped.saturating_add(1);
        }
    }

    /// Files finished, either written or skipped.
    fn files_settled(&self) -> u64 {
        self.files_written
            .saturating_add(self.files_skipped)
            .min(self.files_discovered)
    }

    /// Completion against discovered files (0-100).
    pub fn percentage(&self) -> Option<f64> {
        if self.files_discovered == 0 {
            return None;
        }
        Some((self.files_settled() as f64 / self.files_discovered as f64) * 100.0)
    }

    /// Download rate in files per second.
    pub fn rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.files_written as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Whether a progress update should be emitted based on time or percentage.
    pub fn should_emit_update(&self) -> bool {
        if self.files_written == 0 {
            return false;
        }

        let percentage_jump = self
            .percentage()
            .map(|pct| pct - self.last_reported_percentage >= self.min_percentage_step)
            .unwrap_or(false);

        percentage_jump || self.last_update.elapsed() >= self.update_interval
    }

    /// Call after emitting a progress line to reset the timer and cached percentage.
    pub fn mark_emitted(&mut self) {
        self.last_update = Instant::now();
        if let Some(pct) = self.percentage() {
            self.last_reported_percentage = pct;
        }
    }

    /// Human-readable progress line.
    pub fn format_progress(&self) -> String {
        let mut parts = vec![format!(
            "[PROGRESS] Archived {}/{} files ({})",
            self.files_written,
            self.files_discovered,
            format_bytes(self.bytes_written)
        )];

        if let Some(pct) = self.percentage() {
            parts.push(format!("- {pct:.1}% of discovered"));
        }

        let rate = self.rate();
        if rate > 0.0 {
            parts.push(format!("at {rate:.1} files/sec"));
        }

        if self.warnings > 0 {
            parts.push(format!("- {} skipped", self.warnings));
        }

        parts.push(format!("- {} elapsed", format_duration(self.start_time.elapsed())));
        parts.join(" ")
    }
}

impl Default for WalkProgress {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

/// Compact duration (`42s`, `3m`, `1.5h`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}

/// Compact byte size (`512 B`, `1.5 KiB`, `3.2 MiB`).
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < MIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / MIB)
    }
}
