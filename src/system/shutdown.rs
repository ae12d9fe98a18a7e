use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::metrics::StopReason;
use crate::replay::DispatchState;

/// Turns Ctrl-C (and SIGTERM on unix) into a sticky stop of the run. The
/// task ends on its own once the run is stopped for any reason.
pub fn setup_signal_stop_handler(state: &Arc<DispatchState>) -> JoinHandle<()> {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let stopped = state.stop_notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();
        if state.is_stopped() {
            return;
        }

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        let terminate = async {
            if let Some(signal) = term_signal.as_mut() {
                signal.recv().await;
            } else {
                std::future::pending::<()>().await;
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = &mut stopped => {}
            _ = tokio::signal::ctrl_c() => interrupt(&state),
            () = terminate => interrupt(&state),
        }
    })
}

fn interrupt(state: &DispatchState) {
    if state.request_stop(StopReason::Interrupted) {
        warn!("Interrupted; letting in-flight requests finish.");
    }
}
