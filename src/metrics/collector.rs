use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use super::{ExecutionOutcome, LatencyHistogram, RunFrame, RunSummary};

/// Running totals over every outcome of one run.
#[derive(Debug)]
pub struct MetricsAggregator {
    success_count: u64,
    timeout_count: u64,
    network_error_count: u64,
    rate_limited_count: u64,
    sum_latency_ms: u64,
    min_latency_ms: Option<u64>,
    max_latency_ms: u64,
    histogram: Option<LatencyHistogram>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregator {
    #[must_use]
    pub fn new() -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                warn!("Latency percentiles disabled: {}", err);
                None
            }
        };
        Self {
            success_count: 0,
            timeout_count: 0,
            network_error_count: 0,
            rate_limited_count: 0,
            sum_latency_ms: 0,
            min_latency_ms: None,
            max_latency_ms: 0,
            histogram,
        }
    }

    pub fn record(&mut self, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Success { latency_ms } => {
                self.success_count = self.success_count.saturating_add(1);
                self.sum_latency_ms = self.sum_latency_ms.saturating_add(latency_ms);
                self.min_latency_ms = Some(
                    self.min_latency_ms
                        .map_or(latency_ms, |min| min.min(latency_ms)),
                );
                self.max_latency_ms = self.max_latency_ms.max(latency_ms);
                if let Some(histogram) = self.histogram.as_mut()
                    && let Err(err) = histogram.record(latency_ms)
                {
                    warn!("{}", err);
                }
            }
            ExecutionOutcome::Timeout => {
                self.timeout_count = self.timeout_count.saturating_add(1);
            }
            ExecutionOutcome::NetworkError => {
                self.network_error_count = self.network_error_count.saturating_add(1);
            }
            ExecutionOutcome::RateLimited { .. } => {
                self.rate_limited_count = self.rate_limited_count.saturating_add(1);
            }
        }
    }

    /// Outcomes recorded so far; one per dispatched record.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.success_count
            .saturating_add(self.timeout_count)
            .saturating_add(self.network_error_count)
            .saturating_add(self.rate_limited_count)
    }

    #[must_use]
    pub const fn success_count(&self) -> u64 {
        self.success_count
    }

    #[must_use]
    pub const fn sum_latency_ms(&self) -> u64 {
        self.sum_latency_ms
    }

    /// Mean latency over successful requests in whole milliseconds, `0` when
    /// there were none.
    ///
    /// The division truncates toward zero: latencies of 1ms and 2ms average
    /// to 1ms. `sum_latency_ms` and `success_count` give the exact mean.
    #[must_use]
    pub const fn average_latency_ms(&self) -> u64 {
        match self.sum_latency_ms.checked_div(self.success_count) {
            Some(avg) => avg,
            None => 0,
        }
    }

    #[must_use]
    pub fn finalize(self, frame: RunFrame) -> RunSummary {
        let (p50, p90, p99) = self
            .histogram
            .as_ref()
            .map_or((0, 0, 0), LatencyHistogram::percentiles);
        RunSummary {
            total_dispatched: self.total(),
            total_skipped_after_stop: frame.skipped_after_stop,
            sum_latency_ms: self.sum_latency_ms,
            average_latency_ms: self.average_latency_ms(),
            success_count: self.success_count,
            timeout_count: self.timeout_count,
            network_error_count: self.network_error_count,
            rate_limited_count: self.rate_limited_count,
            min_latency_ms: self.min_latency_ms.unwrap_or(0),
            max_latency_ms: self.max_latency_ms,
            p50_latency_ms: p50,
            p90_latency_ms: p90,
            p99_latency_ms: p99,
            start_wall_clock: frame.start_wall_clock,
            end_wall_clock: frame.end_wall_clock,
            duration: frame.duration,
            stop_reason: frame.stop_reason,
            dispatch: frame.dispatch,
        }
    }
}

/// Spawns the task that owns the aggregator. It returns the aggregator once
/// every sender has been dropped.
#[must_use]
pub fn setup_metrics_collector(
    mut outcome_rx: mpsc::Receiver<ExecutionOutcome>,
) -> JoinHandle<MetricsAggregator> {
    tokio::spawn(async move {
        let mut aggregator = MetricsAggregator::new();
        while let Some(outcome) = outcome_rx.recv().await {
            aggregator.record(outcome);
        }
        aggregator
    })
}
