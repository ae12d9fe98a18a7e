use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::args::SplitArgs;
use crate::error::{AppError, AppResult, RecordError, ValidationError};
use crate::records::{CSV_HEADER, CsvRecordSource, RecordSource, format_record_line};

/// Records buffered per output file between flushes.
const SPLIT_FLUSH_EVERY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitReport {
    pub(crate) out_dir: PathBuf,
    pub(crate) records_per_file: Vec<u64>,
    pub(crate) malformed: u64,
}

impl SplitReport {
    pub(crate) fn total(&self) -> u64 {
        self.records_per_file.iter().copied().sum()
    }
}

struct SplitOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    pending: usize,
    written: u64,
}

impl SplitOutput {
    async fn create(path: PathBuf) -> AppResult<Self> {
        let file = File::create(&path).await.map_err(|err| {
            AppError::records(RecordError::Create {
                path: path.clone(),
                source: err,
            })
        })?;
        let mut output = Self {
            path,
            writer: BufWriter::new(file),
            pending: 0,
            written: 0,
        };
        let header = format!("{}\n", CSV_HEADER);
        output.write(header.as_bytes()).await?;
        Ok(output)
    }

    async fn write(&mut self, bytes: &[u8]) -> AppResult<()> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(|err| self.write_error(err))
    }

    async fn push(&mut self, line: &str) -> AppResult<()> {
        self.write(line.as_bytes()).await?;
        self.written = self.written.saturating_add(1);
        self.pending = self.pending.saturating_add(1);
        if self.pending >= SPLIT_FLUSH_EVERY {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> AppResult<()> {
        self.pending = 0;
        self.writer.flush().await.map_err(|err| self.write_error(err))
    }

    fn write_error(&self, err: std::io::Error) -> AppError {
        AppError::records(RecordError::Write {
            path: self.path.clone(),
            source: err,
        })
    }
}

pub(crate) async fn run_split(args: &SplitArgs) -> AppResult<SplitReport> {
    let out_dir = args.out_dir.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!(
            "gateway-replay-split-{}",
            Utc::now().timestamp_millis()
        ))
    });
    let mut rng = StdRng::from_entropy();
    let report = split_records(&args.input, args.count.get(), &out_dir, &mut rng).await?;
    println!(
        "Wrote {} records across {} files in {}",
        report.total(),
        report.records_per_file.len(),
        report.out_dir.display()
    );
    Ok(report)
}

/// Streams the records of `input` into `0.csv .. {count-1}.csv` under
/// `out_dir`, picking the file for each record at random.
pub(crate) async fn split_records<R>(
    input: &Path,
    count: usize,
    out_dir: &Path,
    rng: &mut R,
) -> AppResult<SplitReport>
where
    R: Rng + Send,
{
    if count == 0 {
        return Err(AppError::validation(ValidationError::ValueTooSmall { min: 1 }));
    }
    let mut source = CsvRecordSource::open(input).await?;
    tokio::fs::create_dir_all(out_dir).await.map_err(|err| {
        AppError::records(RecordError::Create {
            path: out_dir.to_path_buf(),
            source: err,
        })
    })?;

    let mut outputs = Vec::with_capacity(count);
    for index in 0..count {
        outputs.push(SplitOutput::create(out_dir.join(format!("{}.csv", index))).await?);
    }

    while let Some(record) = source.next_record().await? {
        let index = rng.gen_range(0..count);
        let Some(output) = outputs.get_mut(index) else {
            continue;
        };
        output.push(&format_record_line(&record)).await?;
    }

    let mut records_per_file = Vec::with_capacity(count);
    for output in &mut outputs {
        output.flush().await?;
        records_per_file.push(output.written);
    }

    info!(
        "Split {} into {} files under {}",
        input.display(),
        count,
        out_dir.display()
    );
    Ok(SplitReport {
        out_dir: out_dir.to_path_buf(),
        records_per_file,
        malformed: source.malformed(),
    })
}
