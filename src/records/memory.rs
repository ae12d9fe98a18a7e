use async_trait::async_trait;

use crate::error::AppResult;

use super::{RecordSource, RequestRecord};

/// Record source over records already held in memory.
pub struct MemoryRecordSource {
    records: std::vec::IntoIter<RequestRecord>,
}

impl MemoryRecordSource {
    #[must_use]
    pub fn new(records: Vec<RequestRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn next_record(&mut self) -> AppResult<Option<RequestRecord>> {
        Ok(self.records.next())
    }
}
