use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::error::AppResult;

use super::{RecordSource, RequestRecord};

/// Yields the same content fetch over and over, every record due at once.
///
/// Without a limit the source never ends; the run finishes when it stops.
pub struct RepeatRecordSource {
    cid: String,
    path: String,
    recorded_at: DateTime<FixedOffset>,
    limit: Option<u64>,
    next_seq: u64,
}

impl RepeatRecordSource {
    #[must_use]
    pub fn new(cid: &str, path: &str, limit: Option<u64>) -> Self {
        Self {
            cid: cid.to_owned(),
            path: path.to_owned(),
            recorded_at: Utc::now().fixed_offset(),
            limit,
            next_seq: 0,
        }
    }
}

#[async_trait]
impl RecordSource for RepeatRecordSource {
    async fn next_record(&mut self) -> AppResult<Option<RequestRecord>> {
        if self.limit.is_some_and(|limit| self.next_seq >= limit) {
            return Ok(None);
        }
        let record = RequestRecord::new(self.next_seq, self.recorded_at, &self.cid, &self.path);
        self.next_seq = self.next_seq.saturating_add(1);
        Ok(Some(record))
    }

    fn drain_after_stop(&self) -> bool {
        false
    }
}
