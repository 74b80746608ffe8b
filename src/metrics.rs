//! Download observability metrics
//!
//! Counters and histograms for outbound requests, rate-limiter waits and walk
//! outcomes, recorded through the `metrics` facade. Nothing is exported until
//! [`init_metrics`] installs the Prometheus listener; before that every
//! recording call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::downloader::ErrorKind;

static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed
    #[error("failed to install Prometheus exporter on {addr}: {message}")]
    Install {
        /// Requested listener address
        addr: SocketAddr,
        /// Exporter error
        message: String,
    },
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Idempotent: later calls return `Ok(())` without reinstalling. Must be
/// called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if let Some(existing) = METRICS_INITIALIZED.get() {
        debug!(%existing, "Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install {
            addr,
            message: e.to_string(),
        })?;

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Requests sent to GitHub, by operation and outcome"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "Request duration by operation"
    );
    describe_histogram!(
        "rate_limit_wait_seconds",
        Unit::Seconds,
        "Time spent waiting for the request pacing slot"
    );
    describe_gauge!(
        "github_rate_limit_remaining",
        Unit::Count,
        "Remaining requests reported by the x-ratelimit-remaining header"
    );
    describe_counter!(
        "walk_files_written_total",
        Unit::Count,
        "Files written into archives"
    );
    describe_counter!(
        "walk_bytes_written_total",
        Unit::Bytes,
        "Bytes written into archives"
    );
    describe_counter!(
        "walk_warnings_total",
        Unit::Count,
        "Per-item failures recorded as warnings"
    );
    describe_counter!(
        "downloads_completed_total",
        Unit::Count,
        "Downloads that produced an archive"
    );
    describe_counter!(
        "downloads_failed_total",
        Unit::Count,
        "Downloads that ended in a fatal error, by kind"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Timing helper for one outbound request
pub struct HttpRequestMetrics {
    operation: &'static str,
    start_time: Instant,
}

impl HttpRequestMetrics {
    /// Start timing a request for `operation` (`list` or `download`)
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
        }
    }

    /// Record a request that got an HTTP response
    pub fn record_status(&self, status: u16) {
        self.record(status.to_string());
    }

    /// Record a request that failed before a response arrived
    pub fn record_network_error(&self) {
        self.record("network_error".to_string());
    }

    fn record(&self, outcome: String) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "op" => self.operation,
            "outcome" => outcome,
        )
        .increment(1);

        histogram!("http_request_duration_seconds", "op" => self.operation)
            .record(duration.as_secs_f64());
    }
}

/// Record how long a caller waited on the rate limiter
pub fn record_rate_limit_wait(waited: Duration) {
    histogram!("rate_limit_wait_seconds").record(waited.as_secs_f64());
}

/// Record the remaining GitHub quota reported by a response
pub fn record_rate_limit_remaining(remaining: u32) {
    gauge!("github_rate_limit_remaining").set(f64::from(remaining));
}

/// Record a file written into an archive
pub fn record_file_written(bytes: usize) {
    counter!("walk_files_written_total").increment(1);
    counter!("walk_bytes_written_total").increment(bytes as u64);
}

/// Record a per-item failure kept as a warning
pub fn record_walk_warning() {
    counter!("walk_warnings_total").increment(1);
}

/// Record a successful download
pub fn record_download_completed() {
    counter!("downloads_completed_total").increment(1);
}

/// Record a fatal download failure
pub fn record_download_failed(kind: ErrorKind) {
    counter!("downloads_failed_total", "kind" => kind.code()).increment(1);
}
