//! # backoff-clock
//!
//! Exponential backoff with jitter, plus a coordinator that lets many concurrent
//! retry loops share one backoff timer.
//!
//! ## Pieces
//!
//! - [`BackoffClock`]: computes successive wait durations for one retry loop and
//!   enforces attempt limits and a maximum age
//! - [`Waiter`]: anything that blocks until ready or cancelled; the clock is one
//! - [`BroadcastCoordinator`]: drives a single [`Waiter`] on behalf of many callers,
//!   so only one timer is ever in flight
//!
//! The crate never runs or retries the caller's operation. It produces delays, and
//! reports through [`BackoffError`] when retrying must stop.
//!
//! ## Quick Example
//!
//! ```rust
//! use backoff_clock::{BackoffClock, BackoffConfig};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let mut clock = BackoffClock::new(
//!     BackoffConfig::default()
//!         .with_initial(Duration::from_millis(1))
//!         .with_limit(5),
//! );
//! let token = CancellationToken::new();
//!
//! let mut calls = 0;
//! let mut flaky = || {
//!     calls += 1;
//!     if calls < 3 { Err("busy") } else { Ok("done") }
//! };
//!
//! let value = loop {
//!     match flaky() {
//!         Ok(value) => break value,
//!         Err(_) => clock.wait(&token).await.expect("retry budget exhausted"),
//!     }
//! };
//!
//! assert_eq!(value, "done");
//! assert_eq!(clock.attempts(), 2);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod broadcast;
pub mod cancel;
pub mod clock;
pub mod error;
pub mod testing;
pub mod waiter;

// Re-exports
pub use broadcast::BroadcastCoordinator;
pub use cancel::{Cancel, Deadline, Never};
pub use clock::{BackoffClock, BackoffConfig};
pub use error::BackoffError;
pub use waiter::{Bound, Waiter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::broadcast::BroadcastCoordinator;
    pub use crate::cancel::{Cancel, Deadline, Never};
    pub use crate::clock::{BackoffClock, BackoffConfig};
    pub use crate::error::BackoffError;
    pub use crate::waiter::Waiter;
}
