//! Cancellation of in-flight downloads.
//!
//! A [`CancelToken`] is shared between whoever may abort a walk (the Ctrl+C
//! handler in the binary, a caller's own timeout) and the walker, which races
//! every suspension point against [`CancelToken::cancelled`].

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a cancellation token.
pub type SharedCancel = Arc<CancelToken>;

static GLOBAL_CANCEL: OnceCell<SharedCancel> = OnceCell::new();

/// Register the process-wide token so executors pick it up by default.
pub fn set_global_cancel(handle: SharedCancel) {
    let _ = GLOBAL_CANCEL.set(handle);
}

/// Retrieve the registered process-wide token, if any.
pub fn get_global_cancel() -> Option<SharedCancel> {
    GLOBAL_CANCEL.get().cloned()
}

/// One-shot cancellation flag with async wake-up.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new token wrapped in [`Arc`].
    pub fn shared() -> SharedCancel {
        Arc::new(Self::new())
    }

    /// Cancel. Wakes every waiter exactly once; later calls do nothing.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the token is cancelled. Returns immediately if it already is.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel() cannot be missed.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
