use chrono::{DateTime, FixedOffset, Utc};
use tokio::time::Instant;

use crate::records::RequestRecord;

use super::DispatchState;

/// Anchors recorded time to real time. Set from the first record and never
/// changed afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RunEpoch {
    start_instant: Instant,
    start_wall_clock: DateTime<Utc>,
    start_recorded: DateTime<FixedOffset>,
}

impl RunEpoch {
    #[must_use]
    pub fn begin(first: &RequestRecord) -> Self {
        Self {
            start_instant: Instant::now(),
            start_wall_clock: Utc::now(),
            start_recorded: first.recorded_at,
        }
    }

    #[must_use]
    pub const fn start_wall_clock(&self) -> DateTime<Utc> {
        self.start_wall_clock
    }

    /// Real-time instant at which `record` is due. Records stamped before
    /// the epoch are due immediately.
    #[must_use]
    pub fn fire_at(&self, record: &RequestRecord) -> Instant {
        let offset = record
            .recorded_at
            .signed_duration_since(self.start_recorded)
            .to_std()
            .unwrap_or_default();
        self.start_instant
            .checked_add(offset)
            .unwrap_or(self.start_instant)
    }
}

/// Timing gate in front of the dispatcher.
#[derive(Debug, Default)]
pub(crate) struct Pacer {
    epoch: Option<RunEpoch>,
}

impl Pacer {
    pub(crate) const fn new() -> Self {
        Self { epoch: None }
    }

    pub(crate) const fn epoch(&self) -> Option<&RunEpoch> {
        self.epoch.as_ref()
    }

    /// Suspends until `record` is due. Returns false when the run was
    /// stopped before that.
    pub(crate) async fn wait_until_due(
        &mut self,
        record: &RequestRecord,
        state: &DispatchState,
    ) -> bool {
        let epoch = *self.epoch.get_or_insert_with(|| RunEpoch::begin(record));
        let due = epoch.fire_at(record);

        let stop = state.stop_notified();
        tokio::pin!(stop);
        stop.as_mut().enable();
        if state.is_stopped() {
            return false;
        }
        if due <= Instant::now() {
            return true;
        }
        tokio::select! {
            () = tokio::time::sleep_until(due) => !state.is_stopped(),
            () = &mut stop => false,
        }
    }

    /// Blocks while the submitted-but-not-completed depth is at or above
    /// `high`, until it falls to `low`. Returns false when the run was
    /// stopped while waiting.
    pub(crate) async fn wait_for_queue_room(
        state: &DispatchState,
        high: u64,
        low: u64,
    ) -> bool {
        if state.queued() < high {
            return !state.is_stopped();
        }
        state.note_backpressure_pause();
        loop {
            let drained = state.queue_notified();
            tokio::pin!(drained);
            drained.as_mut().enable();
            let stop = state.stop_notified();
            tokio::pin!(stop);
            stop.as_mut().enable();

            if state.is_stopped() {
                return false;
            }
            let depth = state.queued();
            if depth <= low {
                state.note_resume(depth);
                return true;
            }
            tokio::select! {
                () = &mut drained => {}
                () = &mut stop => {}
            }
        }
    }
}
