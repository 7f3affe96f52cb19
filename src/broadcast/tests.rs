//! Tests for the broadcast coordinator.

use super::*;
use crate::clock::{BackoffClock, BackoffConfig};
use crate::testing::{CountingWaiter, PanickingWaiter};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

fn spawn_waiters(coordinator: &BroadcastCoordinator, n: usize) -> Vec<JoinHandle<Outcome>> {
    (0..n)
        .map(|_| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait().await })
        })
        .collect()
}

type Outcome = Result<(), BackoffError>;

async fn collect(handles: Vec<JoinHandle<Outcome>>) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    outcomes
}

/// Sleeps for its interval, then raises `done` just before returning.
struct FlaggingWaiter {
    interval: Duration,
    done: Arc<AtomicBool>,
}

impl Waiter for FlaggingWaiter {
    fn wait(&mut self) -> BoxFuture<'_, Result<(), BackoffError>> {
        async move {
            tokio::time::sleep(self.interval).await;
            self.done.store(true, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }
}

/// Let spawned callers run far enough to register with the actor.
async fn settle_callers() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waits_share_one_timer() {
    let waiter = CountingWaiter::new(Duration::from_millis(50));
    let runs = waiter.counter();
    let coordinator = BroadcastCoordinator::new(waiter);

    let t0 = Instant::now();
    let outcomes = collect(spawn_waiters(&coordinator, 16)).await;

    assert_eq!(runs.get(), 1);
    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(t0.elapsed(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_every_caller_sees_the_same_error() {
    let waiter = CountingWaiter::new(Duration::from_millis(10))
        .failing_with(BackoffError::LimitReached { limit: 7 });
    let runs = waiter.counter();
    let coordinator = BroadcastCoordinator::new(waiter);

    let outcomes = collect(spawn_waiters(&coordinator, 5)).await;

    assert_eq!(runs.get(), 1);
    assert_eq!(outcomes.len(), 5);
    for outcome in outcomes {
        assert!(matches!(
            outcome,
            Err(BackoffError::LimitReached { limit: 7 })
        ));
    }
}

#[tokio::test(start_paused = true)]
async fn test_sequential_waits_start_new_cycles() {
    let waiter = CountingWaiter::new(Duration::from_millis(10));
    let runs = waiter.counter();
    let coordinator = BroadcastCoordinator::new(waiter);

    coordinator.wait().await.unwrap();
    coordinator.wait().await.unwrap();
    coordinator.wait().await.unwrap();

    assert_eq!(runs.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_late_caller_joins_next_cycle() {
    let waiter = CountingWaiter::new(Duration::from_millis(100));
    let runs = waiter.counter();
    let coordinator = BroadcastCoordinator::new(waiter);

    let early = spawn_waiters(&coordinator, 3);
    settle_callers().await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    // The first cycle is over; this caller must not observe its stale result.
    let t0 = Instant::now();
    coordinator.wait().await.unwrap();

    assert!(collect(early).await.iter().all(|o| o.is_ok()));
    assert_eq!(runs.get(), 2);
    assert_eq!(t0.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_caller_joining_as_wait_resolves_gets_next_cycle() {
    let interval = Duration::from_millis(10);

    // The join and the finished wait task reach the actor together; repeat so
    // either readiness order would show up.
    for _ in 0..32 {
        let done = Arc::new(AtomicBool::new(false));
        let coordinator = BroadcastCoordinator::new(FlaggingWaiter {
            interval,
            done: done.clone(),
        });

        let early = spawn_waiters(&coordinator, 1);
        settle_callers().await;

        let late = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                while !done.load(Ordering::SeqCst) {
                    tokio::task::yield_now().await;
                }
                let t0 = Instant::now();
                coordinator.wait().await.map(|()| t0.elapsed())
            })
        };

        tokio::time::advance(interval).await;

        assert!(collect(early).await.iter().all(|o| o.is_ok()));
        assert_eq!(late.await.unwrap().unwrap(), interval);
        coordinator.stop();
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_fans_out_immediately() {
    let waiter = CountingWaiter::new(Duration::from_secs(3600));
    let coordinator = BroadcastCoordinator::new(waiter);

    let callers = spawn_waiters(&coordinator, 8);
    settle_callers().await;

    let t0 = Instant::now();
    coordinator.cancel();
    let outcomes = collect(callers).await;

    assert!(t0.elapsed() < Duration::from_secs(1));
    assert_eq!(outcomes.len(), 8);
    for outcome in outcomes {
        assert!(matches!(outcome, Err(BackoffError::Cancelled)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_delivers_success() {
    let waiter = CountingWaiter::new(Duration::from_secs(3600));
    let coordinator = BroadcastCoordinator::new(waiter);

    let callers = spawn_waiters(&coordinator, 4);
    settle_callers().await;

    coordinator.stop();
    let outcomes = collect(callers).await;

    assert!(outcomes.iter().all(|o| o.is_ok()));
}

#[tokio::test(start_paused = true)]
async fn test_wait_after_stop_fails_fast() {
    let coordinator = BroadcastCoordinator::new(CountingWaiter::new(Duration::from_millis(10)));

    coordinator.stop();
    settle_callers().await;
    assert!(coordinator.is_stopped());

    let t0 = Instant::now();
    let result = coordinator.wait().await;

    assert!(matches!(result, Err(BackoffError::AlreadyStopped)));
    assert_eq!(t0.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_wait_queued_behind_cancel_fails_fast() {
    let coordinator = BroadcastCoordinator::new(CountingWaiter::new(Duration::from_millis(10)));

    // Both commands are queued before the actor runs.
    coordinator.cancel();
    let result = coordinator.wait().await;

    assert!(matches!(result, Err(BackoffError::AlreadyStopped)));
}

#[tokio::test(start_paused = true)]
async fn test_second_shutdown_is_noop() {
    let coordinator = BroadcastCoordinator::new(CountingWaiter::new(Duration::from_millis(10)));

    coordinator.cancel();
    settle_callers().await;
    coordinator.cancel();
    coordinator.stop();

    assert!(coordinator.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_stop_queued_behind_cancel_is_dropped() {
    let coordinator = BroadcastCoordinator::new(CountingWaiter::new(Duration::from_secs(3600)));

    let callers = spawn_waiters(&coordinator, 3);
    settle_callers().await;

    // Neither command has been processed yet; only the first one takes effect.
    coordinator.cancel();
    coordinator.stop();
    let outcomes = collect(callers).await;

    for outcome in outcomes {
        assert!(matches!(outcome, Err(BackoffError::Cancelled)));
    }
    assert!(coordinator.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_panicking_waiter_reports_lost() {
    let coordinator = BroadcastCoordinator::new(PanickingWaiter);

    assert!(matches!(
        coordinator.wait().await,
        Err(BackoffError::WaiterLost)
    ));
    assert!(coordinator.is_stopped());
    assert!(matches!(
        coordinator.wait().await,
        Err(BackoffError::AlreadyStopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_shared_clock_limit_reaches_all_callers() {
    let clock = BackoffClock::with_seed(
        BackoffConfig::default()
            .with_initial(Duration::from_millis(10))
            .with_limit(1),
        11,
    );
    let coordinator = BroadcastCoordinator::new(clock);

    let first = collect(spawn_waiters(&coordinator, 4)).await;
    assert!(first.iter().all(|o| o.is_ok()));

    let second = collect(spawn_waiters(&coordinator, 4)).await;
    for outcome in second {
        assert!(matches!(
            outcome,
            Err(BackoffError::LimitReached { limit: 1 })
        ));
    }
}
