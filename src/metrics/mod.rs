//! Outcome types, latency histogram, and the aggregator that turns a run's
//! outcomes into a [`RunSummary`].
mod collector;
mod histogram;
mod types;


pub use collector::{MetricsAggregator, setup_metrics_collector};
pub use histogram::LatencyHistogram;
pub use types::{DispatchStats, ExecutionOutcome, RunFrame, RunSummary, StopReason};
