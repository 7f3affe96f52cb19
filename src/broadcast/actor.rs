//! # Coordinator actor: one shared wait, many receivers.
//!
//! The actor owns the wrapped [`Waiter`] and the list of pending callers. It reacts to
//! one event at a time:
//!
//! ```text
//!   Join ──► push reply ──► Idle? ──► spawn wait task ──► Waiting
//!
//!   wait task done ──► broadcast outcome to every pending reply ──► Idle
//!
//!   Cancel ──► broadcast Err(Cancelled) ──► Stopped
//!   Stop   ──► broadcast Ok(())         ──► Stopped
//! ```
//!
//! ## Rules
//! - At most **one** wait task exists at a time
//! - Every reply queued when a wait completes receives **that** outcome
//! - A reply queued after a broadcast waits for the **next** wait
//! - A finished wait task is settled before the next command is read
//! - `Stopped` is terminal; the in-flight task (if any) is detached and its result dropped

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::BackoffError;
use crate::waiter::Waiter;

pub(crate) type Outcome = Result<(), BackoffError>;

/// Requests sent from coordinator handles to the actor.
pub(crate) enum Command {
    Join(oneshot::Sender<Outcome>),
    Cancel,
    Stop,
}

enum State<W> {
    Idle(W),
    Waiting(JoinHandle<(W, Outcome)>),
    Stopped,
}

pub(crate) struct Actor<W> {
    state: State<W>,
    pending: Vec<oneshot::Sender<Outcome>>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl<W: Waiter + 'static> Actor<W> {
    pub(crate) fn new(waiter: W, rx: mpsc::UnboundedReceiver<Command>) -> Self {
        Self {
            state: State::Idle(waiter),
            pending: Vec::new(),
            rx,
        }
    }

    /// Processes events until cancelled, stopped, or every handle is dropped.
    pub(crate) async fn run(mut self) {
        while !matches!(self.state, State::Stopped) {
            // A finished wait is flushed before any queued command, so a join sent
            // after the wait resolved lands in the next cycle.
            tokio::select! {
                biased;

                joined = settle(&mut self.state), if matches!(self.state, State::Waiting(_)) => {
                    match joined {
                        Ok((waiter, outcome)) => {
                            self.state = State::Idle(waiter);
                            self.broadcast(outcome);
                        }
                        Err(e) => {
                            warn!(error = %e, "shared waiter lost; stopping coordinator");
                            self.broadcast(Err(BackoffError::WaiterLost));
                            self.state = State::Stopped;
                        }
                    }
                }
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Join(reply)) => self.join(reply),
                    Some(Command::Cancel) => {
                        info!(pending = self.pending.len(), "coordinator cancelled");
                        self.broadcast(Err(BackoffError::Cancelled));
                        self.state = State::Stopped;
                    }
                    Some(Command::Stop) => {
                        info!(pending = self.pending.len(), "coordinator stopped");
                        self.broadcast(Ok(()));
                        self.state = State::Stopped;
                    }
                    None => {
                        debug!("all coordinator handles dropped");
                        self.state = State::Stopped;
                    }
                },
            }
        }
    }

    fn join(&mut self, reply: oneshot::Sender<Outcome>) {
        self.pending.push(reply);
        self.state = match std::mem::replace(&mut self.state, State::Stopped) {
            State::Idle(mut waiter) => {
                debug!("starting shared wait");
                State::Waiting(tokio::spawn(async move {
                    let outcome = waiter.wait().await;
                    (waiter, outcome)
                }))
            }
            other => other,
        };
    }

    fn broadcast(&mut self, outcome: Outcome) {
        let receivers = self.pending.len();
        for reply in self.pending.drain(..) {
            // A caller that gave up has dropped its receiver; nothing to deliver.
            let _ = reply.send(outcome.clone());
        }
        debug!(
            receivers,
            outcome = outcome.as_ref().err().map_or("ok", BackoffError::as_label),
            "broadcast shared wait outcome"
        );
    }
}

/// Resolves when the in-flight wait finishes; never resolves otherwise.
async fn settle<W>(state: &mut State<W>) -> Result<(W, Outcome), JoinError> {
    match state {
        State::Waiting(handle) => handle.await,
        _ => std::future::pending().await,
    }
}
