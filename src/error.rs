//! Error types for backoff operations.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Reason a backoff wait did not complete successfully.
///
/// Every variant tells the caller that its retrying must stop: nothing in this
/// crate retries on its own. The type is `Clone` so a [`BroadcastCoordinator`]
/// can hand the same value to every queued caller.
///
/// # Examples
///
/// ```rust
/// use backoff_clock::{BackoffClock, BackoffConfig, BackoffError};
///
/// let mut clock = BackoffClock::new(BackoffConfig::default().with_limit(1));
/// assert!(clock.advance().is_ok());
///
/// let err = clock.advance().unwrap_err();
/// assert!(matches!(err, BackoffError::LimitReached { limit: 1 }));
/// assert_eq!(err.as_label(), "limit_reached");
/// ```
///
/// [`BroadcastCoordinator`]: crate::BroadcastCoordinator
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum BackoffError {
    /// The attempt budget is exhausted.
    #[error("retry limit reached ({limit} attempts)")]
    LimitReached {
        /// The configured attempt limit.
        limit: u32,
    },

    /// The cumulative age budget is exhausted.
    #[error("operation is expired (max age {max_age:?})")]
    Expired {
        /// The configured maximum age.
        max_age: Duration,
    },

    /// The caller's cancellation token fired.
    #[error("wait cancelled")]
    Cancelled,

    /// The caller's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The coordinator was cancelled or stopped before this wait was issued.
    #[error("coordinator already stopped")]
    AlreadyStopped,

    /// The coordinator's wrapped waiter panicked and cannot be driven again.
    #[error("shared waiter was lost")]
    WaiterLost,

    /// A custom [`Waiter`](crate::Waiter) failed with its own error.
    #[error("waiter failed: {0}")]
    Waiter(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackoffError {
    /// Wrap an arbitrary error produced by a custom waiter.
    pub fn waiter<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Waiter(Arc::new(error))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::LimitReached { .. } => "limit_reached",
            Self::Expired { .. } => "expired",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::AlreadyStopped => "already_stopped",
            Self::WaiterLost => "waiter_lost",
            Self::Waiter(_) => "waiter_failed",
        }
    }

    /// Returns true if an external token or deadline caused this error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
