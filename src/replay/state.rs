use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Notify, futures::Notified};

use crate::metrics::{DispatchStats, StopReason};

const NO_RESUME: u64 = u64::MAX;

/// Run-scoped counters shared by the pacer, the workers and the monitor.
///
/// `stopped` only ever goes from false to true; the first reason recorded
/// wins.
#[derive(Debug)]
pub struct DispatchState {
    outstanding: AtomicU64,
    queued: AtomicU64,
    dispatched: AtomicU64,
    completed: AtomicU64,
    skipped: AtomicU64,
    peak_outstanding: AtomicU64,
    peak_queued: AtomicU64,
    backpressure_pauses: AtomicU64,
    last_resume_depth: AtomicU64,
    stopped: AtomicBool,
    stop_reason: OnceLock<StopReason>,
    stop_signal: Notify,
    queue_drained: Notify,
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outstanding: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            peak_outstanding: AtomicU64::new(0),
            peak_queued: AtomicU64::new(0),
            backpressure_pauses: AtomicU64::new(0),
            last_resume_depth: AtomicU64::new(NO_RESUME),
            stopped: AtomicBool::new(false),
            stop_reason: OnceLock::new(),
            stop_signal: Notify::const_new(),
            queue_drained: Notify::const_new(),
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Sets the sticky stop flag. Returns true for the call that flipped it.
    #[must_use]
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let first = self
            .stopped
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            drop(self.stop_reason.set(reason));
            self.stop_signal.notify_waiters();
        }
        first
    }

    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.get().copied()
    }

    /// Future resolving on the next stop. Enable it before checking
    /// [`Self::is_stopped`] to avoid missing the wake-up.
    pub fn stop_notified(&self) -> Notified<'_> {
        self.stop_signal.notified()
    }

    /// Future resolving on the next completion or discarded job.
    pub fn queue_notified(&self) -> Notified<'_> {
        self.queue_drained.notified()
    }

    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    pub(crate) fn enter_queue(&self) {
        let depth = self.queued.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak_queued.fetch_max(depth, Ordering::SeqCst);
    }

    /// A queued job finished, either executed or discarded after a stop.
    pub(crate) fn leave_queue(&self) {
        saturating_decrement(&self.queued);
        self.queue_drained.notify_waiters();
    }

    pub(crate) fn mark_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn mark_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_skipped(&self, count: u64) {
        self.skipped.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn note_backpressure_pause(&self) {
        self.backpressure_pauses.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn note_resume(&self, depth: u64) {
        self.last_resume_depth.store(depth, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stats(&self, malformed_records: u64) -> DispatchStats {
        let last_resume_depth = match self.last_resume_depth.load(Ordering::SeqCst) {
            NO_RESUME => None,
            depth => Some(depth),
        };
        DispatchStats {
            peak_outstanding: self.peak_outstanding.load(Ordering::SeqCst),
            peak_queued: self.peak_queued.load(Ordering::SeqCst),
            backpressure_pauses: self.backpressure_pauses.load(Ordering::SeqCst),
            last_resume_depth,
            malformed_records,
        }
    }
}

/// Holds one unit of `outstanding` for as long as a request executes.
pub(crate) struct InflightGuard<'state> {
    counter: &'state AtomicU64,
}

impl<'state> InflightGuard<'state> {
    pub(crate) fn acquire(state: &'state DispatchState) -> Self {
        let now = state
            .outstanding
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        state.peak_outstanding.fetch_max(now, Ordering::SeqCst);
        Self {
            counter: &state.outstanding,
        }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        saturating_decrement(self.counter);
    }
}

fn saturating_decrement(counter: &AtomicU64) {
    loop {
        let current = counter.load(Ordering::SeqCst);
        let Some(next) = current.checked_sub(1) else {
            break;
        };
        if counter
            .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}
