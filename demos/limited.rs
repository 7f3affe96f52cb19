//! Bounded Backoff Example
//!
//! Retries an operation that never succeeds, with every bound enabled:
//! - first delay around 100ms, doubling each attempt
//! - each delay clamped to 200ms
//! - at most 5 attempts
//! - at most 2 seconds overall
//!
//! The attempt limit is hit first, so the loop ends with "retry limit reached".
//!
//! Run with `RUST_LOG=backoff_clock=trace` to see every computed delay.

use std::time::Duration;

use backoff_clock::{BackoffClock, BackoffConfig};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn operation() -> Result<(), &'static str> {
    Err("fail")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backoff_clock=info".into()),
        )
        .init();

    // delays: ~100ms, 200ms, 200ms, 200ms, 200ms
    let mut clock = BackoffClock::new(
        BackoffConfig::default()
            .with_initial(Duration::from_millis(100))
            .with_peak(Duration::from_millis(200))
            .with_limit(5)
            .with_max_age(Duration::from_secs(2)),
    );
    let token = CancellationToken::new();
    let started = Instant::now();

    while let Err(err) = operation() {
        println!("attempt {} failed: {}", clock.attempts() + 1, err);
        if let Err(err) = clock.wait(&token).await {
            println!("{}", err);
            break;
        }
    }

    println!("gave up after {:?}", started.elapsed());
}
