//! Cancellation sources a backoff wait can race against.
//!
//! The crate never creates cancellation on its own; callers pass in whatever
//! they already have. Anything implementing [`Cancel`] works:
//!
//! - [`CancellationToken`]: fires with [`BackoffError::Cancelled`]
//! - [`Deadline`]: fires with [`BackoffError::DeadlineExceeded`] at a fixed instant,
//!   optionally racing a token as well
//! - [`Never`]: never fires

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::BackoffError;

/// A signal that can abort a wait, reporting why it fired.
pub trait Cancel: Send + Sync {
    /// Resolves once the signal fires, yielding the reason.
    ///
    /// Must be cancel-safe: dropping the future before it resolves has no effect
    /// on the signal itself.
    fn cancelled(&self) -> impl Future<Output = BackoffError> + Send + '_;
}

impl Cancel for CancellationToken {
    fn cancelled(&self) -> impl Future<Output = BackoffError> + Send + '_ {
        async move {
            CancellationToken::cancelled(self).await;
            BackoffError::Cancelled
        }
    }
}

/// A point in time after which waits fail with [`BackoffError::DeadlineExceeded`].
///
/// # Examples
///
/// ```rust
/// use backoff_clock::{BackoffClock, BackoffConfig, BackoffError, Deadline};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut clock = BackoffClock::new(
///     BackoffConfig::default().with_initial(Duration::from_secs(5)),
/// );
/// let deadline = Deadline::after(Duration::from_millis(10));
///
/// let err = clock.wait(&deadline).await.unwrap_err();
/// assert!(matches!(err, BackoffError::DeadlineExceeded));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    token: Option<CancellationToken>,
}

impl Deadline {
    /// Fire at the given instant.
    pub fn at(at: Instant) -> Self {
        Self { at, token: None }
    }

    /// Fire once `timeout` has elapsed from now.
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Also fire (with [`BackoffError::Cancelled`]) when `token` is cancelled.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// The instant this deadline fires.
    pub fn instant(&self) -> Instant {
        self.at
    }
}

impl Cancel for Deadline {
    fn cancelled(&self) -> impl Future<Output = BackoffError> + Send + '_ {
        async move {
            match &self.token {
                Some(token) => tokio::select! {
                    _ = tokio::time::sleep_until(self.at) => BackoffError::DeadlineExceeded,
                    _ = token.cancelled() => BackoffError::Cancelled,
                },
                None => {
                    tokio::time::sleep_until(self.at).await;
                    BackoffError::DeadlineExceeded
                }
            }
        }
    }
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Cancel for Never {
    fn cancelled(&self) -> impl Future<Output = BackoffError> + Send + '_ {
        std::future::pending()
    }
}
