//! The blocking capability a [`BroadcastCoordinator`](crate::BroadcastCoordinator) drives.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::cancel::{Cancel, Never};
use crate::clock::BackoffClock;
use crate::error::BackoffError;

/// Something that blocks until it is ready, or fails.
///
/// [`BackoffClock`] is the canonical implementation, but any cancellable blocking
/// primitive qualifies: a rate limiter, a lease renewal, a readiness probe.
///
/// # Examples
///
/// ```rust
/// use backoff_clock::{BackoffError, Waiter};
/// use futures::future::BoxFuture;
/// use futures::FutureExt;
/// use std::time::Duration;
///
/// struct Tick(Duration);
///
/// impl Waiter for Tick {
///     fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
///         tokio::time::sleep(self.0).map(Ok).boxed()
///     }
/// }
/// ```
pub trait Waiter: Send {
    /// Block until ready; `Ok(())` on success.
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>>;
}

/// Waits without an external token; coordinator-level cancellation covers aborts.
impl Waiter for BackoffClock {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        BackoffClock::wait(self, &Never).boxed()
    }
}

impl<W: Waiter + ?Sized> Waiter for Box<W> {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        (**self).wait()
    }
}

/// A [`BackoffClock`] paired with the cancellation source every wait races.
///
/// Created by [`BackoffClock::bind`].
#[derive(Debug)]
pub struct Bound<C> {
    clock: BackoffClock,
    cancel: C,
}

impl<C> Bound<C> {
    pub(crate) fn new(clock: BackoffClock, cancel: C) -> Self {
        Self { clock, cancel }
    }

    /// The underlying clock.
    pub fn clock(&self) -> &BackoffClock {
        &self.clock
    }

    /// Mutable access to the clock, e.g. for [`BackoffClock::set_next`].
    pub fn clock_mut(&mut self) -> &mut BackoffClock {
        &mut self.clock
    }

    /// Separate the clock from its cancellation source.
    pub fn into_parts(self) -> (BackoffClock, C) {
        (self.clock, self.cancel)
    }
}

impl<C: Cancel> Waiter for Bound<C> {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        let Self { clock, cancel } = self;
        clock.wait(&*cancel).boxed()
    }
}
