use tracing::warn;

use crate::metrics::{ExecutionOutcome, StopReason};

use super::DispatchState;

/// Inspects one outcome and trips the stop flag on any non-success
/// response. In-flight requests are left alone.
pub fn observe_outcome(state: &DispatchState, outcome: ExecutionOutcome) {
    let Some(status_code) = outcome.rate_limit_status() else {
        return;
    };
    if state.request_stop(StopReason::RateLimited { status_code }) {
        warn!(
            "Gateway answered with status {}; no further records will be dispatched.",
            status_code
        );
    }
}
