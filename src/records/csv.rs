use std::borrow::Cow;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::error::{AppError, AppResult, RecordError};

use super::{RecordSource, RequestRecord};

pub(crate) const CSV_HEADER: &str = "ts,cid,path";

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Streams request records from a CSV file with a `ts,cid[,path]` header.
///
/// Only one line is held in memory at a time. Lines that cannot be read as a
/// record are logged and skipped.
pub struct CsvRecordSource {
    path: PathBuf,
    reader: BufReader<File>,
    line: String,
    columns: Option<Columns>,
    next_seq: u64,
    line_no: u64,
    malformed: u64,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    ts: usize,
    cid: usize,
    path: Option<usize>,
}

impl CsvRecordSource {
    /// Opens `path` for streaming.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when nothing readable exists at
    /// `path`, or an open error for other I/O failures.
    pub async fn open(path: &Path) -> AppResult<Self> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                return Err(AppError::records(RecordError::NotFound {
                    path: path.to_path_buf(),
                }));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::records(RecordError::NotFound {
                    path: path.to_path_buf(),
                }));
            }
            Err(err) => {
                return Err(AppError::records(RecordError::Open {
                    path: path.to_path_buf(),
                    source: err,
                }));
            }
        }
        let file = File::open(path).await.map_err(|err| {
            AppError::records(RecordError::Open {
                path: path.to_path_buf(),
                source: err,
            })
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line: String::new(),
            columns: None,
            next_seq: 0,
            line_no: 0,
            malformed: 0,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_header(&self, fields: &[String]) -> AppResult<Columns> {
        let find = |name: &'static str| {
            fields
                .iter()
                .position(|field| field.trim().trim_start_matches('\u{feff}') == name)
        };
        let ts = find("ts").ok_or_else(|| {
            AppError::records(RecordError::MissingColumn {
                path: self.path.clone(),
                column: "ts",
            })
        })?;
        let cid = find("cid").ok_or_else(|| {
            AppError::records(RecordError::MissingColumn {
                path: self.path.clone(),
                column: "cid",
            })
        })?;
        Ok(Columns {
            ts,
            cid,
            path: find("path"),
        })
    }

    fn parse_record(&self, columns: Columns, fields: &[String]) -> Option<RequestRecord> {
        let ts = fields.get(columns.ts)?.trim();
        let recorded_at = parse_timestamp(ts)?;
        let cid = fields.get(columns.cid)?.trim();
        if cid.is_empty() {
            return None;
        }
        let path = columns
            .path
            .and_then(|index| fields.get(index))
            .map_or("", |value| value.trim());
        Some(RequestRecord::new(self.next_seq, recorded_at, cid, path))
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn next_record(&mut self) -> AppResult<Option<RequestRecord>> {
        loop {
            self.line.clear();
            let bytes = self.reader.read_line(&mut self.line).await.map_err(|err| {
                AppError::records(RecordError::Read {
                    path: self.path.clone(),
                    source: err,
                })
            })?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_no = self.line_no.saturating_add(1);
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let fields = split_fields(trimmed);

            let Some(columns) = self.columns else {
                self.columns = Some(self.parse_header(&fields)?);
                continue;
            };

            match self.parse_record(columns, &fields) {
                Some(record) => {
                    self.next_seq = self.next_seq.saturating_add(1);
                    return Ok(Some(record));
                }
                None => {
                    self.malformed = self.malformed.saturating_add(1);
                    warn!(
                        "Skipping malformed entry at {}:{}",
                        self.path.display(),
                        self.line_no
                    );
                }
            }
        }
    }

    fn malformed(&self) -> u64 {
        self.malformed
    }
}

/// Reads a recorded timestamp.
///
/// RFC 3339 is tried first. Offsets may also be written `+hhmm` or `+hh`,
/// and a timestamp without any offset is taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

/// Splits one CSV line, honouring double-quoted fields and `""` escapes.
pub(crate) fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (other, _) => current.push(other),
        }
    }
    fields.push(current);
    fields
}

fn quote_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Renders `record` as one `ts,cid,path` line, newline included.
pub(crate) fn format_record_line(record: &RequestRecord) -> String {
    format!(
        "{},{},{}\n",
        record.recorded_at_utc(),
        quote_field(&record.cid),
        quote_field(&record.path)
    )
}
