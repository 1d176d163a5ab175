//! Timing scheduler for pulse and blink tasks
//!
//! Each active pulse or blink runs on its own named worker thread. The worker
//! parks on a crossbeam channel with a timeout: a timeout is a scheduled state
//! flip, a message (or a disconnect) is cooperative cancellation observed at
//! the next wake-up. Cancellation joins the worker, so a superseding task
//! never overlaps the one it replaces, and no thread outlives its owner.
//!
//! No caller thread waits on a scheduled flip, so provider failures inside a
//! worker are reported through the log instead of a return value.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use crate::pin::PinCore;
use crate::types::PinState;

/// What a scheduled task is doing, for thread names and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    Pulse,
    Blink,
}

impl TaskKind {
    fn label(self) -> &'static str {
        match self {
            TaskKind::Pulse => "pulse",
            TaskKind::Blink => "blink",
        }
    }
}

/// An in-flight pulse or blink
///
/// Owns the cancellation channel and the worker's join handle. Dropping a
/// task cancels it, so replacing the task stored in a pin's slot supersedes
/// the old one even on racy overwrites.
pub(crate) struct ScheduledTask {
    kind: TaskKind,
    cancel_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Receiver that disconnects when the worker exits (complete or cancelled)
    pub(crate) fn completion(&self) -> Receiver<()> {
        self.done_rx.clone()
    }

    /// Signal cancellation and wait for the worker to observe it
    ///
    /// The worker wakes immediately from its timed park, so this returns
    /// promptly rather than after the remaining delay.
    pub(crate) fn cancel(&mut self) {
        let _ = self.cancel_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            // A listener callback may cancel from inside the worker itself;
            // a thread cannot join itself, so just leave the signal behind.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            let kind = self.kind;
            if handle.join().is_err() {
                debug!("{} worker panicked during join", kind.label());
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Number of whole `delay` increments that fit in `duration` (truncating)
fn whole_increments(duration: Duration, delay: Duration) -> u64 {
    (duration.as_millis() / delay.as_millis()) as u64
}

fn spawn_worker<F>(kind: TaskKind, address: u8, body: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(format!("pinhub-{}-{}", kind.label(), address))
        .spawn(body)
        .expect("Failed to spawn scheduler worker thread")
}

/// Arm a one-shot pulse: after `duration`, drive the pin to the complement of
/// `active`. The initial edge to `active` has already been applied by the
/// caller.
pub(crate) fn spawn_pulse(core: Arc<PinCore>, duration: Duration, active: PinState) -> ScheduledTask {
    let (cancel_tx, cancel_rx) = bounded::<()>(1);
    let (done_tx, done_rx) = bounded::<()>(0);
    let address = core.address();

    let handle = spawn_worker(TaskKind::Pulse, address, move || {
        // Dropped on exit; releases any blocking waiter
        let _done = done_tx;

        match cancel_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => {
                core.apply_scheduled_state(active.complement());
            }
            _ => debug!("pulse on pin {} cancelled", address),
        }
    });

    ScheduledTask {
        kind: TaskKind::Pulse,
        cancel_tx,
        done_rx,
        handle: Some(handle),
    }
}

/// Arm a repeating blink: flip the pin every `delay` for the whole increments
/// of `duration`, then leave it in the complement of `active`. The initial
/// edge to `active` has already been applied by the caller.
pub(crate) fn spawn_blink(
    core: Arc<PinCore>,
    delay: Duration,
    duration: Duration,
    active: PinState,
) -> ScheduledTask {
    let (cancel_tx, cancel_rx) = bounded::<()>(1);
    let (done_tx, done_rx) = bounded::<()>(0);
    let address = core.address();
    let increments = whole_increments(duration, delay);

    let handle = spawn_worker(TaskKind::Blink, address, move || {
        let _done = done_tx;

        let mut current = active;
        for _ in 0..increments {
            match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    current = current.complement();
                    if !core.apply_scheduled_state(current) {
                        // Pin was unexported underneath us; nothing left to drive
                        return;
                    }
                }
                _ => {
                    debug!("blink on pin {} cancelled", address);
                    return;
                }
            }
        }

        // A blink window always ends in the inactive state
        if current == active {
            core.apply_scheduled_state(active.complement());
        }
    });

    ScheduledTask {
        kind: TaskKind::Blink,
        cancel_tx,
        done_rx,
        handle: Some(handle),
    }
}
