//! Request pacing
//!
//! Serializes request starts so that no two outbound requests begin less
//! than `min_interval` apart. Concurrency is not limited here, only the rate
//! at which new requests are issued.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Minimum-interval rate limiter shared by every request of a process.
///
/// The read-compute-write of the last request timestamp happens inside a
/// single critical section, so concurrent callers are admitted one at a time
/// and each waits for its own slot.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter spacing request starts by at least `min_interval`
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the caller may start a request.
    ///
    /// Returns how long the caller was suspended. The lock is held across the
    /// sleep; a caller queued behind it computes its wait from the timestamp
    /// the previous holder recorded.
    pub async fn acquire(&self) -> Duration {
        let mut last_request = self.last_request.lock().await;
        let started = Instant::now();

        if let Some(last) = *last_request {
            let ready_at = last + self.min_interval;
            if ready_at > started {
                sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last_request = Some(now);
        now.saturating_duration_since(started)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(super::config::MIN_REQUEST_INTERVAL_MS))
    }
}
