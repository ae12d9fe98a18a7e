use chrono::SecondsFormat;

use crate::metrics::RunSummary;

pub(crate) fn summary_lines(summary: &RunSummary, source: &str) -> Vec<String> {
    let stopped = summary
        .stop_reason
        .map_or_else(|| "no".to_owned(), |reason| reason.to_string());
    let resume_depth = summary
        .dispatch
        .last_resume_depth
        .map_or_else(|| "-".to_owned(), |depth| depth.to_string());

    vec![
        format!("Source: {}", source),
        format!(
            "Started: {}",
            summary
                .start_wall_clock
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        format!(
            "Ended: {}",
            summary
                .end_wall_clock
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        format!("Duration: {}ms", summary.duration.as_millis()),
        format!("Dispatched: {}", summary.total_dispatched),
        format!("Skipped After Stop: {}", summary.total_skipped_after_stop),
        format!("Successful: {}", summary.success_count),
        format!("Timeouts: {}", summary.timeout_count),
        format!("Network Errors: {}", summary.network_error_count),
        format!("Rate Limited: {}", summary.rate_limited_count),
        format!("Latency Sum (ok): {}ms", summary.sum_latency_ms),
        format!("Avg Latency (ok): {}ms", summary.average_latency_ms),
        format!(
            "Min/Max Latency (ok): {}ms / {}ms",
            summary.min_latency_ms, summary.max_latency_ms
        ),
        format!(
            "P50/P90/P99 Latency (ok): {}ms / {}ms / {}ms",
            summary.p50_latency_ms, summary.p90_latency_ms, summary.p99_latency_ms
        ),
        format!(
            "Peak In Flight / Queued: {} / {}",
            summary.dispatch.peak_outstanding, summary.dispatch.peak_queued
        ),
        format!(
            "Backpressure Pauses: {} (last resume at depth {})",
            summary.dispatch.backpressure_pauses, resume_depth
        ),
        format!("Malformed Records: {}", summary.dispatch.malformed_records),
        format!("Stopped Early: {}", stopped),
    ]
}

pub(crate) fn print_summary(summary: &RunSummary, source: &str) {
    for line in summary_lines(summary, source) {
        println!("{}", line);
    }
}
