//! Exponential backoff clock with jitter, attempt limits and age expiry.
//!
//! A [`BackoffClock`] hands out successive wait durations for a single retry loop:
//!
//! - **Exponential**: the base doubles every attempt (1s, 2s, 4s, ... by default)
//! - **Jittered**: each duration is drawn from `[base / 2, base)`
//! - **Bounded**: an optional peak clamps each duration, an optional limit caps the
//!   number of attempts, and an optional max age expires the whole sequence
//!
//! The clock only measures time; it never runs the operation being retried.
//!
//! # Quick Start
//!
//! ```rust
//! use backoff_clock::{BackoffClock, BackoffConfig, BackoffError};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let mut clock = BackoffClock::new(
//!     BackoffConfig::default()
//!         .with_initial(Duration::from_millis(1))
//!         .with_limit(3),
//! );
//! let token = CancellationToken::new();
//!
//! let mut attempts = 0;
//! let outcome = loop {
//!     attempts += 1;
//!     if let Err(err) = clock.wait(&token).await {
//!         break err;
//!     }
//! };
//!
//! assert!(matches!(outcome, BackoffError::LimitReached { limit: 3 }));
//! assert_eq!(attempts, 4);
//! # });
//! ```
//!
//! # Jitter Range
//!
//! Jitter only ever shortens a delay: the returned duration lies in
//! `[0.5 × base, 1.0 × base)`, never above the base. Bases shorter than two
//! nanoseconds are returned as-is.

mod config;
mod jitter;

pub use config::BackoffConfig;

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cancel::Cancel;
use crate::error::BackoffError;
use crate::waiter::Bound;

/// Stateful exponential backoff calculator.
///
/// A clock belongs to one retry loop at a time: [`advance`](Self::advance) and
/// [`wait`](Self::wait) take `&mut self`. To share one clock between many concurrent
/// loops, wrap it in a [`BroadcastCoordinator`](crate::BroadcastCoordinator).
///
/// # Examples
///
/// ```rust
/// use backoff_clock::{BackoffClock, BackoffConfig};
/// use std::time::Duration;
///
/// let mut clock = BackoffClock::with_seed(
///     BackoffConfig::default().with_initial(Duration::from_millis(100)),
///     7,
/// );
///
/// let first = clock.advance().unwrap();
/// assert!(first >= Duration::from_millis(50) && first < Duration::from_millis(100));
///
/// let second = clock.advance().unwrap();
/// assert_eq!(clock.current_base(), Duration::from_millis(200));
/// assert!(second >= Duration::from_millis(100) && second < Duration::from_millis(200));
/// ```
pub struct BackoffClock {
    config: BackoffConfig,
    attempts: u32,
    current_base: Duration,
    next_override: Option<Duration>,
    origin: Option<Instant>,
    rng: StdRng,
}

impl BackoffClock {
    /// Create a clock whose jitter is seeded from the operating system.
    pub fn new(config: BackoffConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a clock with deterministic jitter.
    pub fn with_seed(config: BackoffConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Create a clock that draws jitter from `rng`.
    pub fn with_rng(config: BackoffConfig, rng: StdRng) -> Self {
        Self {
            config,
            attempts: 0,
            current_base: Duration::ZERO,
            next_override: None,
            origin: None,
            rng,
        }
    }

    /// Compute the next wait duration without sleeping.
    ///
    /// Fails with [`BackoffError::LimitReached`] once `limit` attempts have been
    /// handed out; that check leaves the clock untouched. Fails with
    /// [`BackoffError::Expired`] when the elapsed age plus the candidate duration
    /// reaches `max_age`; in that case the attempt is still counted and the base
    /// still doubles.
    pub fn advance(&mut self) -> Result<Duration, BackoffError> {
        let limit = self.config.limit;
        if limit > 0 && self.attempts >= limit {
            debug!(attempts = self.attempts, limit, "backoff limit reached");
            return Err(BackoffError::LimitReached { limit });
        }

        self.current_base = if self.attempts == 0 {
            self.config.first_base()
        } else {
            self.current_base.saturating_mul(2)
        };
        self.attempts = self.attempts.saturating_add(1);

        let mut delay = match self.next_override.take() {
            Some(d) if !d.is_zero() => d,
            _ => jitter::upper_half(self.current_base, &mut self.rng),
        };
        let peak = self.config.peak;
        if !peak.is_zero() && delay > peak {
            delay = peak;
        }

        let origin = *self.origin.get_or_insert_with(Instant::now);
        let max_age = self.config.max_age;
        if !max_age.is_zero() {
            let age = origin.elapsed().saturating_add(delay);
            if age >= max_age {
                debug!(attempts = self.attempts, ?age, ?max_age, "backoff expired");
                return Err(BackoffError::Expired { max_age });
            }
        }

        trace!(
            attempt = self.attempts,
            base = ?self.current_base,
            ?delay,
            "backoff advanced"
        );
        Ok(delay)
    }

    /// Sleep for the next duration, or until `cancel` fires.
    ///
    /// Returns the error from [`advance`](Self::advance) without sleeping if a bound
    /// has been hit. A cancelled wait still counts as an attempt.
    pub async fn wait(&mut self, cancel: &impl Cancel) -> Result<(), BackoffError> {
        let delay = self.advance()?;
        tokio::select! {
            biased;
            reason = cancel.cancelled() => Err(reason),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Use `d` verbatim, without jitter, for the next call only.
    ///
    /// The peak clamp and age check still apply. A zero duration clears the override.
    pub fn set_next(&mut self, d: Duration) {
        self.next_override = Some(d);
    }

    /// Begin measuring age now, unless it is already being measured.
    ///
    /// The first [`advance`](Self::advance) does this implicitly.
    pub fn start(&mut self) {
        self.origin.get_or_insert_with(Instant::now);
    }

    /// Bind a cancellation source, producing a [`Waiter`](crate::Waiter) that honours it.
    pub fn bind<C: Cancel>(self, cancel: C) -> Bound<C> {
        Bound::new(self, cancel)
    }

    /// Number of attempts handed out so far, including ones that expired.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The most recent pre-jitter base.
    pub fn current_base(&self) -> Duration {
        self.current_base
    }

    /// Time elapsed since age tracking began, or zero if it has not begun.
    pub fn age(&self) -> Duration {
        self.origin.map(|o| o.elapsed()).unwrap_or_default()
    }

    /// The configuration this clock was built from.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }
}

impl Default for BackoffClock {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

impl fmt::Debug for BackoffClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffClock")
            .field("config", &self.config)
            .field("attempts", &self.attempts)
            .field("current_base", &self.current_base)
            .field("next_override", &self.next_override)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
