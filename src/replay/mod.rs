//! Timing-faithful replay: the pacer, the admission-controlled worker pool,
//! the rate-limit monitor and the run driver tying them together.
mod dispatch;
mod monitor;
mod options;
mod pacer;
mod progress;
mod runner;
mod state;


pub use monitor::observe_outcome;
pub use options::{
    DEFAULT_CONCURRENCY, DEFAULT_MIN_SPACING, DEFAULT_PROGRESS_INTERVAL, DEFAULT_QUEUE_HIGH,
    DEFAULT_QUEUE_LOW, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SPACING_PENALTY, ReplayOptions,
};
pub use pacer::RunEpoch;
pub use runner::run_replay;
pub use state::DispatchState;
