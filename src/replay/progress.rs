use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::DispatchState;

/// Logs dispatcher counters every `interval` until `done_rx` fires.
pub(super) fn setup_progress_reporter(
    state: Arc<DispatchState>,
    interval: Duration,
    mut done_rx: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = &mut done_rx => break,
                _ = ticker.tick() => {
                    info!(
                        "Progress: {} dispatched, {} completed, {} queued, {} in flight{}",
                        state.dispatched(),
                        state.completed(),
                        state.queued(),
                        state.outstanding(),
                        if state.is_stopped() { ", stopped" } else { "" }
                    );
                }
            }
        }
    })
}
