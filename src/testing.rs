//! Test doubles for code built on [`Waiter`] and [`BroadcastCoordinator`].
//!
//! These waiters make the interesting properties of a coordinator observable:
//! how many underlying waits actually ran, and what every caller received.
//!
//! # Examples
//!
//! ```rust
//! use backoff_clock::testing::CountingWaiter;
//! use backoff_clock::BroadcastCoordinator;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let waiter = CountingWaiter::new(Duration::from_millis(5));
//! let runs = waiter.counter();
//! let coordinator = BroadcastCoordinator::new(waiter);
//!
//! let (a, b) = tokio::join!(coordinator.wait(), coordinator.wait());
//! assert!(a.is_ok() && b.is_ok());
//! assert_eq!(runs.get(), 1);
//! # });
//! ```
//!
//! [`BroadcastCoordinator`]: crate::BroadcastCoordinator

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::BackoffError;
use crate::waiter::Waiter;

/// Shared count of how many times a waiter was driven.
#[derive(Debug, Clone, Default)]
pub struct RunCounter(Arc<AtomicUsize>);

impl RunCounter {
    /// Current count.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sleeps a fixed interval per wait and counts how often it ran.
#[derive(Debug)]
pub struct CountingWaiter {
    interval: Duration,
    outcome: Result<(), BackoffError>,
    runs: RunCounter,
}

impl CountingWaiter {
    /// Succeed after `interval` on every wait.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            outcome: Ok(()),
            runs: RunCounter::default(),
        }
    }

    /// Fail with `error` after the interval instead of succeeding.
    pub fn failing_with(mut self, error: BackoffError) -> Self {
        self.outcome = Err(error);
        self
    }

    /// Handle to the run count, usable after the waiter is moved away.
    pub fn counter(&self) -> RunCounter {
        self.runs.clone()
    }
}

impl Waiter for CountingWaiter {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        async move {
            self.runs.bump();
            tokio::time::sleep(self.interval).await;
            self.outcome.clone()
        }
        .boxed()
    }
}

/// Panics on every wait, standing in for a buggy waiter.
#[derive(Debug, Default)]
pub struct PanickingWaiter;

impl Waiter for PanickingWaiter {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        futures::future::lazy(|_| -> Result<(), BackoffError> { panic!("waiter blew up") }).boxed()
    }
}
