//! Jitter applied to backoff bases.

use std::time::Duration;

use rand::Rng;

/// Draws a duration uniformly from `[base / 2, base)`.
///
/// Bases under two nanoseconds cannot be halved without reaching zero, so they are
/// returned unchanged.
pub(crate) fn upper_half<R: Rng>(base: Duration, rng: &mut R) -> Duration {
    let half = base / 2;
    let span = u64::try_from(half.as_nanos()).unwrap_or(u64::MAX);
    if span == 0 {
        return base;
    }
    base - half + Duration::from_nanos(rng.random_range(0..span))
}
