//! Cooperative cancellation for in-flight searches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned when a search notices it has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("search cancelled")]
pub struct Cancelled;

/// Shared flag checked by the matchers between stop and route iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Bail out with `Cancelled` once cancellation was requested.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Returns a guard that cancels this flag when dropped, unless it was
    /// disarmed first.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            flag: Some(self.clone()),
        }
    }
}

/// Cancels its flag on drop.
///
/// Held by a request handler so that a client hanging up (which drops the
/// handler future) stops the search running on a worker task.
#[derive(Debug)]
pub struct CancelOnDrop {
    flag: Option<CancelFlag>,
}

impl CancelOnDrop {
    /// Drop the guard without cancelling.
    pub fn disarm(mut self) {
        self.flag = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(flag) = self.flag.take() {
            flag.cancel();
        }
    }
}
