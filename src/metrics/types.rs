use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Result of executing one dispatched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success { latency_ms: u64 },
    Timeout,
    NetworkError,
    RateLimited { status_code: u16 },
}

impl ExecutionOutcome {
    /// Classifies a received response: 2xx is a success, anything else is
    /// treated as the gateway pushing back.
    #[must_use]
    pub const fn from_status(status_code: u16, latency_ms: u64) -> Self {
        if matches!(status_code, 200..=299) {
            Self::Success { latency_ms }
        } else {
            Self::RateLimited { status_code }
        }
    }

    #[must_use]
    pub const fn latency_ms(self) -> Option<u64> {
        match self {
            Self::Success { latency_ms } => Some(latency_ms),
            Self::Timeout | Self::NetworkError | Self::RateLimited { .. } => None,
        }
    }

    #[must_use]
    pub const fn rate_limit_status(self) -> Option<u16> {
        match self {
            Self::RateLimited { status_code } => Some(status_code),
            Self::Success { .. } | Self::Timeout | Self::NetworkError => None,
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { latency_ms } => write!(f, "success in {}ms", latency_ms),
            Self::Timeout => f.write_str("timeout"),
            Self::NetworkError => f.write_str("network error"),
            Self::RateLimited { status_code } => write!(f, "status {}", status_code),
        }
    }
}

/// Why a run stopped dispatching before its input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    RateLimited { status_code: u16 },
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited { status_code } => {
                write!(f, "rate limited (status {})", status_code)
            }
            Self::Interrupted => f.write_str("interrupted"),
        }
    }
}

/// Dispatcher instrumentation captured at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub peak_outstanding: u64,
    pub peak_queued: u64,
    pub backpressure_pauses: u64,
    pub last_resume_depth: Option<u64>,
    pub malformed_records: u64,
}

/// Run-level facts the aggregator cannot observe from outcomes alone.
#[derive(Debug, Clone, Copy)]
pub struct RunFrame {
    pub start_wall_clock: DateTime<Utc>,
    pub end_wall_clock: DateTime<Utc>,
    pub duration: Duration,
    pub skipped_after_stop: u64,
    pub stop_reason: Option<StopReason>,
    pub dispatch: DispatchStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_dispatched: u64,
    pub total_skipped_after_stop: u64,
    pub sum_latency_ms: u64,
    /// `sum_latency_ms / success_count`, truncated to whole milliseconds.
    pub average_latency_ms: u64,
    pub success_count: u64,
    pub timeout_count: u64,
    pub network_error_count: u64,
    pub rate_limited_count: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub start_wall_clock: DateTime<Utc>,
    pub end_wall_clock: DateTime<Utc>,
    pub duration: Duration,
    pub stop_reason: Option<StopReason>,
    pub dispatch: DispatchStats,
}

impl RunSummary {
    #[must_use]
    pub const fn stopped_early(&self) -> bool {
        self.stop_reason.is_some()
    }
}
