//! Sharing one backoff timer across many concurrent waiters.
//!
//! When many tasks back off against the same resource, each running its own timer is
//! wasteful and spreads their retries arbitrarily. A [`BroadcastCoordinator`] wraps a
//! single [`Waiter`] and coalesces concurrent demand for it:
//!
//! - the first caller starts one underlying wait
//! - callers arriving while it runs queue behind it
//! - when it finishes, every queued caller receives the same outcome
//!
//! Timer usage stays constant no matter how many callers share the coordinator.
//!
//! # Example
//!
//! ```rust
//! use backoff_clock::{BackoffClock, BackoffConfig, BroadcastCoordinator};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let clock = BackoffClock::new(
//!     BackoffConfig::default()
//!         .with_initial(Duration::from_millis(5))
//!         .with_limit(2),
//! );
//! let shared = BroadcastCoordinator::new(clock);
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|_| {
//!         let shared = shared.clone();
//!         tokio::spawn(async move { shared.wait().await })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     // Either the first or the second shared wait served this worker.
//!     assert!(worker.await.unwrap().is_ok());
//! }
//! # });
//! ```

mod actor;

use tokio::sync::{mpsc, oneshot};

use crate::error::BackoffError;
use crate::waiter::Waiter;

use actor::{Actor, Command};

/// Handle to a coordinator that fans one shared wait out to many callers.
///
/// Cloning the handle is cheap; all clones drive the same underlying waiter. The
/// coordinator shuts down after [`cancel`](Self::cancel), [`stop`](Self::stop), or
/// once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct BroadcastCoordinator {
    tx: mpsc::UnboundedSender<Command>,
}

impl BroadcastCoordinator {
    /// Spawn a coordinator driving `waiter`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<W: Waiter + 'static>(waiter: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Actor::new(waiter, rx).run());
        Self { tx }
    }

    /// Wait for the shared waiter, joining the in-flight wait if there is one.
    ///
    /// Every caller queued when a wait completes receives that wait's outcome.
    /// Returns [`BackoffError::AlreadyStopped`] immediately once the coordinator has
    /// shut down.
    pub async fn wait(&self) -> Result<(), BackoffError> {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(Command::Join(reply))
            .map_err(|_| BackoffError::AlreadyStopped)?;
        // A dropped reply means the actor shut down before serving this call.
        outcome
            .await
            .unwrap_or(Err(BackoffError::AlreadyStopped))
    }

    /// Abort: every queued caller receives [`BackoffError::Cancelled`], then the
    /// coordinator shuts down for good.
    ///
    /// The in-flight wait is not interrupted; it finishes in the background and its
    /// result is discarded. Calling this on a stopped coordinator does nothing.
    ///
    /// Shutdown is acknowledged asynchronously: a later `cancel` or `stop` sent
    /// before the actor has processed this one is queued behind it and dropped
    /// unread, so it also does nothing.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    /// Shut down cleanly: every queued caller receives `Ok(())`.
    ///
    /// Calling this on a stopped coordinator does nothing, and neither does a
    /// shutdown request still queued behind an earlier [`cancel`](Self::cancel) or
    /// `stop`.
    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }

    /// True once the coordinator has shut down.
    ///
    /// Becomes true only after the shutdown request has been processed, so it may
    /// still read false immediately after [`cancel`](Self::cancel) or
    /// [`stop`](Self::stop).
    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests;
