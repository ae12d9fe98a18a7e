use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::http::RequestExecutor;
use crate::metrics::ExecutionOutcome;
use crate::records::RequestRecord;

use super::monitor::observe_outcome;
use super::state::InflightGuard;
use super::{DispatchState, ReplayOptions};

/// Everything a worker slot shares with its siblings.
pub(super) struct WorkerContext {
    pub(super) jobs: Mutex<mpsc::Receiver<RequestRecord>>,
    pub(super) executor: RequestExecutor,
    pub(super) state: Arc<DispatchState>,
    pub(super) outcome_tx: mpsc::Sender<ExecutionOutcome>,
    pub(super) options: ReplayOptions,
}

/// Spawns `options.concurrency` worker slots pulling from one FIFO queue.
pub(super) fn spawn_workers(context: &Arc<WorkerContext>) -> Vec<JoinHandle<()>> {
    (0..context.options.concurrency)
        .map(|slot| {
            let context = Arc::clone(context);
            tokio::spawn(async move { run_worker(slot, &context).await })
        })
        .collect()
}

async fn run_worker(slot: usize, context: &WorkerContext) {
    let mut last_start: Option<Instant> = None;
    loop {
        // Spacing is applied before taking a job so the queue stays FIFO.
        if let Some(started) = last_start
            && started.elapsed() < context.options.min_spacing
        {
            wait_spacing_penalty(context).await;
        }

        let next = {
            let mut jobs = context.jobs.lock().await;
            jobs.recv().await
        };
        let Some(record) = next else {
            break;
        };

        if context.state.is_stopped() {
            debug!("Slot {} discarded record #{} after stop", slot, record.seq);
            context.state.add_skipped(1);
            context.state.leave_queue();
            continue;
        }

        last_start = Some(Instant::now());
        let outcome = {
            let _in_flight = InflightGuard::acquire(&context.state);
            context.state.mark_dispatched();
            context.executor.execute(&record).await
        };

        observe_outcome(&context.state, outcome);
        debug!(
            "Slot {} finished record #{} ({}{}): {}",
            slot, record.seq, record.cid, record.path, outcome
        );
        if context.outcome_tx.send(outcome).await.is_err() {
            warn!("Metrics collector closed; outcome of record #{} lost.", record.seq);
        }
        context.state.mark_completed();
        context.state.leave_queue();
    }
}

/// Sleeps for the spacing penalty, cut short when the run stops so queued
/// records are discarded without waiting it out.
async fn wait_spacing_penalty(context: &WorkerContext) {
    let stop = context.state.stop_notified();
    tokio::pin!(stop);
    stop.as_mut().enable();
    if context.state.is_stopped() {
        return;
    }
    tokio::select! {
        () = tokio::time::sleep(context.options.spacing_penalty) => {}
        () = &mut stop => {}
    }
}
