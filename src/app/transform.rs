use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{info, warn};

use crate::args::TransformArgs;
use crate::cid::normalize_cid;
use crate::error::{AppError, AppResult, RecordError};
use crate::records::{CSV_HEADER, RequestRecord, format_record_line};

/// Lines buffered between flushes of the output file.
const TRANSFORM_FLUSH_EVERY: usize = 100;

const TIMESTAMP_PATTERN: &str =
    r"\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d(?:\.\d+)?(?:Z|[+-][0-2]\d:[0-5]\d)";
const PATH_STYLE_PATTERN: &str = r#"GET /ipfs/([A-Za-z0-9]+)(/[^\s"?#]*)?"#;
const SUBDOMAIN_PATTERN: &str = r#"([A-Za-z0-9]+)\.ipfs\.[A-Za-z0-9.-]+(?::\d+)?(/[^\s"?#]*)?"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransformReport {
    pub(crate) output: PathBuf,
    pub(crate) written: u64,
    pub(crate) skipped: u64,
}

/// Pulls `(timestamp, cid, path)` out of free-text gateway access log lines.
#[derive(Debug, Clone)]
pub(crate) struct LogLineParser {
    timestamp: Regex,
    path_style: Regex,
    subdomain: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogEntry {
    pub(crate) recorded_at: DateTime<FixedOffset>,
    pub(crate) cid: String,
    pub(crate) path: String,
}

impl LogLineParser {
    pub(crate) fn new() -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|err| AppError::records(RecordError::Pattern { source: err }))
        };
        Ok(Self {
            timestamp: compile(TIMESTAMP_PATTERN)?,
            path_style: compile(PATH_STYLE_PATTERN)?,
            subdomain: compile(SUBDOMAIN_PATTERN)?,
        })
    }

    /// Path-style requests win over subdomain hosts when a line has both.
    pub(crate) fn parse(&self, line: &str) -> Option<LogEntry> {
        let recorded_at = self
            .timestamp
            .find(line)
            .and_then(|found| DateTime::parse_from_rfc3339(found.as_str()).ok())?;
        let captures = self
            .path_style
            .captures(line)
            .or_else(|| self.subdomain.captures(line))?;
        let cid = captures.get(1)?.as_str();
        let path = captures.get(2).map_or("", |found| found.as_str());
        Some(LogEntry {
            recorded_at,
            cid: normalize_cid(cid),
            path: path.to_owned(),
        })
    }
}

pub(crate) async fn run_transform(args: &TransformArgs) -> AppResult<TransformReport> {
    let report = transform_log(&args.input, &args.out_dir).await?;
    println!(
        "Wrote {} records to {} ({} lines skipped)",
        report.written,
        report.output.display(),
        report.skipped
    );
    Ok(report)
}

/// Converts the access log at `input` into `{out_dir}/{unix-ms}.csv`.
pub(crate) async fn transform_log(input: &Path, out_dir: &Path) -> AppResult<TransformReport> {
    let parser = LogLineParser::new()?;
    let file = File::open(input).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::records(RecordError::NotFound {
                path: input.to_path_buf(),
            })
        } else {
            AppError::records(RecordError::Open {
                path: input.to_path_buf(),
                source: err,
            })
        }
    })?;
    let mut lines = BufReader::new(file).lines();

    tokio::fs::create_dir_all(out_dir).await.map_err(|err| {
        AppError::records(RecordError::Create {
            path: out_dir.to_path_buf(),
            source: err,
        })
    })?;
    let output = out_dir.join(format!("{}.csv", Utc::now().timestamp_millis()));
    let write_error = |err: std::io::Error| {
        AppError::records(RecordError::Write {
            path: output.clone(),
            source: err,
        })
    };
    let out_file = File::create(&output).await.map_err(|err| {
        AppError::records(RecordError::Create {
            path: output.clone(),
            source: err,
        })
    })?;
    let mut writer = BufWriter::new(out_file);
    writer
        .write_all(format!("{}\n", CSV_HEADER).as_bytes())
        .await
        .map_err(write_error)?;

    let mut written: u64 = 0;
    let mut skipped: u64 = 0;
    let mut pending: usize = 0;
    let mut line_no: u64 = 0;
    while let Some(line) = lines.next_line().await.map_err(|err| {
        AppError::records(RecordError::Read {
            path: input.to_path_buf(),
            source: err,
        })
    })? {
        line_no = line_no.saturating_add(1);
        if line.trim().is_empty() {
            continue;
        }
        let Some(entry) = parser.parse(&line) else {
            skipped = skipped.saturating_add(1);
            warn!("Skipping unrecognised log line {}: {}", line_no, line);
            continue;
        };
        let record = RequestRecord::new(written, entry.recorded_at, &entry.cid, &entry.path);
        writer
            .write_all(format_record_line(&record).as_bytes())
            .await
            .map_err(write_error)?;
        written = written.saturating_add(1);
        pending = pending.saturating_add(1);
        if pending >= TRANSFORM_FLUSH_EVERY {
            writer.flush().await.map_err(write_error)?;
            pending = 0;
        }
    }
    writer.flush().await.map_err(write_error)?;

    info!(
        "Transformed {} into {} ({} written, {} skipped)",
        input.display(),
        output.display(),
        written,
        skipped
    );
    Ok(TransformReport {
        output,
        written,
        skipped,
    })
}
