//! Backoff configuration.

use std::time::Duration;

/// Bounds and starting point for a [`BackoffClock`](crate::BackoffClock).
///
/// The configuration is plain data. A zero value in any field means "use the default"
/// (for `initial`) or "unbounded" (for everything else), so `BackoffConfig::default()`
/// yields an unbounded backoff starting at one second.
///
/// # Examples
///
/// ```rust
/// use backoff_clock::BackoffConfig;
/// use std::time::Duration;
///
/// // 100ms, 200ms, then clamped at 200ms, at most 5 attempts within 2 seconds
/// let config = BackoffConfig::default()
///     .with_initial(Duration::from_millis(100))
///     .with_peak(Duration::from_millis(200))
///     .with_limit(5)
///     .with_max_age(Duration::from_secs(2));
///
/// assert_eq!(config.limit(), 5);
/// assert_eq!(config.peak(), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackoffConfig {
    pub(crate) initial: Duration,
    pub(crate) peak: Duration,
    pub(crate) limit: u32,
    pub(crate) max_age: Duration,
}

impl BackoffConfig {
    /// Fallback base for the first attempt when `initial` is zero.
    pub const DEFAULT_INITIAL: Duration = Duration::from_secs(1);

    /// Set the base duration of the first attempt.
    pub fn with_initial(mut self, initial: Duration) -> Self {
        self.initial = initial;
        self
    }

    /// Clamp every computed duration to at most `peak`. Zero disables the clamp.
    pub fn with_peak(mut self, peak: Duration) -> Self {
        self.peak = peak;
        self
    }

    /// Allow at most `limit` attempts. Zero means unlimited.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Expire once the total elapsed time would reach `max_age`. Zero means never.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Configured first-attempt base (zero if unset).
    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// Configured clamp ceiling.
    pub fn peak(&self) -> Duration {
        self.peak
    }

    /// Configured attempt limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Configured maximum age.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Base used for attempt 0.
    pub(crate) fn first_base(&self) -> Duration {
        if self.initial.is_zero() {
            Self::DEFAULT_INITIAL
        } else {
            self.initial
        }
    }
}
