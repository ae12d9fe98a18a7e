//! Request records and the sources that stream them in recorded order.
mod csv;
mod memory;
mod repeat;
mod types;


use async_trait::async_trait;

use crate::error::AppResult;

pub use csv::CsvRecordSource;
pub(crate) use csv::{CSV_HEADER, format_record_line};
pub use memory::MemoryRecordSource;
pub use repeat::RepeatRecordSource;
pub use types::RequestRecord;

/// A single-pass, lazily-read sequence of request records.
#[async_trait]
pub trait RecordSource: Send {
    /// Returns the next record in source order, or `None` once exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying input cannot be read.
    async fn next_record(&mut self) -> AppResult<Option<RequestRecord>>;

    /// Entries skipped so far because they could not be read as a record.
    fn malformed(&self) -> u64 {
        0
    }

    /// Whether the rest of the source is read after a stop to count it as
    /// skipped. Sources without a natural end opt out.
    fn drain_after_stop(&self) -> bool {
        true
    }
}
