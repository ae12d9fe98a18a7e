use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};

pub const DEFAULT_CONCURRENCY: usize = 2;
pub const DEFAULT_QUEUE_HIGH: usize = 500;
pub const DEFAULT_QUEUE_LOW: usize = 200;
pub const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(50);
pub const DEFAULT_SPACING_PENALTY: Duration = Duration::from_millis(200);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Tunables for one replay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Worker slots, i.e. the most requests executing at once.
    pub concurrency: usize,
    /// Submitted-but-not-completed depth at which the pacer pauses.
    pub queue_high: usize,
    /// Depth the queue must fall to before the pacer resumes.
    pub queue_low: usize,
    pub min_spacing: Duration,
    pub spacing_penalty: Duration,
    pub request_timeout: Duration,
    /// `None` disables periodic progress logging.
    pub progress_interval: Option<Duration>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            queue_high: DEFAULT_QUEUE_HIGH,
            queue_low: DEFAULT_QUEUE_LOW,
            min_spacing: DEFAULT_MIN_SPACING,
            spacing_penalty: DEFAULT_SPACING_PENALTY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress_interval: Some(DEFAULT_PROGRESS_INTERVAL),
        }
    }
}

impl ReplayOptions {
    /// Checks the cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error when concurrency or the high watermark is zero, the
    /// low watermark is not below the high one, or the timeout is zero.
    pub fn validate(&self) -> AppResult<()> {
        if self.concurrency == 0 || self.queue_high == 0 {
            return Err(AppError::validation(ValidationError::ValueTooSmall { min: 1 }));
        }
        if self.queue_low >= self.queue_high {
            return Err(AppError::validation(ValidationError::WatermarksInverted {
                low: self.queue_low,
                high: self.queue_high,
            }));
        }
        if self.request_timeout.is_zero() {
            return Err(AppError::validation(ValidationError::DurationZero));
        }
        Ok(())
    }
}
