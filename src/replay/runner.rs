use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::http::RequestExecutor;
use crate::metrics::{RunFrame, RunSummary, setup_metrics_collector};
use crate::records::{RecordSource, RequestRecord};

use super::dispatch::{WorkerContext, spawn_workers};
use super::pacer::Pacer;
use super::progress::setup_progress_reporter;
use super::{DispatchState, ReplayOptions};

const OUTCOME_CHANNEL_CAPACITY: usize = 1024;

/// Replays every record of `source` through `executor` and returns the run
/// summary once the input is exhausted, or the run stopped and in-flight
/// work drained.
///
/// `state` is shared with the caller so a signal handler can stop the run.
///
/// # Errors
///
/// Returns an error when the options are invalid, the source fails to read,
/// or a worker task panics.
pub async fn run_replay<S>(
    mut source: S,
    executor: RequestExecutor,
    options: ReplayOptions,
    state: Arc<DispatchState>,
) -> AppResult<RunSummary>
where
    S: RecordSource,
{
    options.validate()?;
    let run_start = Instant::now();
    let fallback_start_wall_clock = Utc::now();
    let high = u64::try_from(options.queue_high).unwrap_or(u64::MAX);
    let low = u64::try_from(options.queue_low).unwrap_or(u64::MAX);

    let (job_tx, job_rx) = mpsc::channel(options.queue_high);
    let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
    let collector = setup_metrics_collector(outcome_rx);

    let progress = options.progress_interval.map(|interval| {
        let (done_tx, done_rx) = oneshot::channel();
        let handle = setup_progress_reporter(Arc::clone(&state), interval, done_rx);
        (done_tx, handle)
    });

    let context = Arc::new(WorkerContext {
        jobs: Mutex::new(job_rx),
        executor,
        state: Arc::clone(&state),
        outcome_tx,
        options,
    });
    let workers = spawn_workers(&context);
    drop(context);

    let mut pacer = Pacer::new();
    let paced = pace_records(&mut source, &mut pacer, &state, &job_tx, high, low).await;
    drop(job_tx);

    for worker in workers {
        worker.await?;
    }
    let aggregator = collector.await?;
    if let Some((done_tx, handle)) = progress {
        drop(done_tx.send(()));
        handle.await?;
    }
    paced?;

    let end_wall_clock = Utc::now();
    let stop_reason = state.stop_reason();
    let frame = RunFrame {
        start_wall_clock: pacer
            .epoch()
            .map_or(fallback_start_wall_clock, |epoch| epoch.start_wall_clock()),
        end_wall_clock,
        duration: run_start.elapsed(),
        skipped_after_stop: state.skipped(),
        stop_reason,
        dispatch: state.stats(source.malformed()),
    };
    let summary = aggregator.finalize(frame);
    match stop_reason {
        Some(reason) => warn!(
            "Run stopped early ({}): {} dispatched, {} skipped.",
            reason, summary.total_dispatched, summary.total_skipped_after_stop
        ),
        None => info!(
            "Run finished: {} dispatched in {}ms.",
            summary.total_dispatched,
            summary.duration.as_millis()
        ),
    }
    Ok(summary)
}

/// Feeds records to the worker queue in source order, honoring recorded
/// timing and the queue watermarks. After a stop the rest of a draining
/// source is read only to count what was skipped.
async fn pace_records<S>(
    source: &mut S,
    pacer: &mut Pacer,
    state: &DispatchState,
    job_tx: &mpsc::Sender<RequestRecord>,
    high: u64,
    low: u64,
) -> AppResult<()>
where
    S: RecordSource,
{
    while let Some(record) = source.next_record().await? {
        if !pacer.wait_until_due(&record, state).await
            || !Pacer::wait_for_queue_room(state, high, low).await
        {
            state.add_skipped(1);
            break;
        }
        state.enter_queue();
        if job_tx.send(record).await.is_err() {
            // Every worker is gone; joining them reports why.
            state.leave_queue();
            break;
        }
    }

    if state.is_stopped() && source.drain_after_stop() {
        let mut remaining: u64 = 0;
        while source.next_record().await?.is_some() {
            remaining = remaining.saturating_add(1);
        }
        state.add_skipped(remaining);
    }
    Ok(())
}
