use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// One recorded content fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Position among the records produced by the source, starting at 0.
    pub seq: u64,
    pub recorded_at: DateTime<FixedOffset>,
    pub cid: String,
    /// Path below the content root, empty when the request targeted the root.
    pub path: String,
}

impl RequestRecord {
    #[must_use]
    pub fn new(seq: u64, recorded_at: DateTime<FixedOffset>, cid: &str, path: &str) -> Self {
        Self {
            seq,
            recorded_at,
            cid: cid.to_owned(),
            path: path.to_owned(),
        }
    }

    /// Recorded timestamp as RFC 3339 UTC with millisecond precision.
    #[must_use]
    pub fn recorded_at_utc(&self) -> String {
        self.recorded_at
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
