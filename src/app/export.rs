use std::path::Path;

use chrono::SecondsFormat;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::{RunSummary, StopReason};

pub(crate) fn summary_json(summary: &RunSummary, source: &str) -> serde_json::Value {
    let duration_ms = u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX);
    let stop_reason = summary.stop_reason.map(|reason| match reason {
        StopReason::RateLimited { status_code } => serde_json::json!({
            "kind": "rateLimited",
            "statusCode": status_code
        }),
        StopReason::Interrupted => serde_json::json!({ "kind": "interrupted" }),
    });

    serde_json::json!({
        "source": source,
        "sum": summary.sum_latency_ms,
        "avg": summary.average_latency_ms,
        "successCount": summary.success_count,
        "timeoutCount": summary.timeout_count,
        "rateLimitedCount": summary.rate_limited_count,
        "networkErrorCount": summary.network_error_count,
        "totalDispatched": summary.total_dispatched,
        "totalSkippedAfterStop": summary.total_skipped_after_stop,
        "startWallClock": summary
            .start_wall_clock
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        "endWallClock": summary
            .end_wall_clock
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        "durationMs": duration_ms,
        "minLatencyMs": summary.min_latency_ms,
        "maxLatencyMs": summary.max_latency_ms,
        "p50LatencyMs": summary.p50_latency_ms,
        "p90LatencyMs": summary.p90_latency_ms,
        "p99LatencyMs": summary.p99_latency_ms,
        "stopReason": stop_reason,
        "dispatch": {
            "peakOutstanding": summary.dispatch.peak_outstanding,
            "peakQueued": summary.dispatch.peak_queued,
            "backpressurePauses": summary.dispatch.backpressure_pauses,
            "lastResumeDepth": summary.dispatch.last_resume_depth,
            "malformedRecords": summary.dispatch.malformed_records
        }
    })
}

pub(crate) async fn export_summary_json(
    path: &Path,
    summary: &RunSummary,
    source: &str,
) -> AppResult<()> {
    let payload = summary_json(summary, source);
    let json = serde_json::to_vec_pretty(&payload)
        .map_err(|err| AppError::sink(SinkError::SerializeSummary { source: err }))?;
    let write_error = |err: std::io::Error| {
        AppError::sink(SinkError::WriteSummary {
            path: path.to_path_buf(),
            source: err,
        })
    };

    let file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await.map_err(write_error)?;
    writer.write_all(b"\n").await.map_err(write_error)?;
    writer.flush().await.map_err(write_error)?;
    Ok(())
}
