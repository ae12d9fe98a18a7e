use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::args::ReplayArgs;
use crate::error::AppResult;
use crate::http::{RequestExecutor, ReqwestFetcher, build_client, download_to_file};
use crate::metrics::RunSummary;
use crate::records::{CsvRecordSource, RecordSource};
use crate::replay::{DispatchState, run_replay};
use crate::system::shutdown::setup_signal_stop_handler;

use super::export::export_summary_json;
use super::summary::print_summary;

/// Replays the CSV at `input` against the configured gateway.
pub(crate) async fn run_start(args: &ReplayArgs, input: &Path) -> AppResult<RunSummary> {
    replay_file(args, input, &input.display().to_string()).await
}

/// Fetches `{cid}/{file_name}` from the gateway into a scratch directory and
/// replays it. The directory is removed afterwards whatever the outcome.
pub(crate) async fn run_start_w3(
    args: &ReplayArgs,
    cid: &str,
    file_name: &str,
) -> AppResult<RunSummary> {
    let target = args.gateway_target()?;
    let url = target.url_for(cid, file_name);
    let local_name = Path::new(file_name)
        .file_name()
        .map_or_else(|| OsString::from("records.csv"), OsStr::to_os_string);

    let scratch = tempfile::Builder::new()
        .prefix("gateway-replay-")
        .tempdir()?;
    let dest = scratch.path().join(local_name);

    let client = build_client(&args.client_settings())?;
    download_to_file(&client, &url, &dest).await?;

    let result = replay_file(args, &dest, &url).await;
    if let Err(err) = scratch.close() {
        warn!("Failed to remove download directory: {}", err);
    }
    result
}

async fn replay_file(args: &ReplayArgs, input: &Path, source_label: &str) -> AppResult<RunSummary> {
    let source = CsvRecordSource::open(input).await?;
    replay_source(args, source, source_label).await
}

/// Replays `source` against the configured gateway, then prints and exports
/// the summary as the global options ask.
pub(super) async fn replay_source<S>(
    args: &ReplayArgs,
    source: S,
    source_label: &str,
) -> AppResult<RunSummary>
where
    S: RecordSource,
{
    let options = args.replay_options()?;
    let target = args.gateway_target()?;

    let client = build_client(&args.client_settings())?;
    let fetcher = Arc::new(ReqwestFetcher::new(client, args.drain_body));
    info!(
        "Replaying {} against {} (concurrency {}, timeout {}ms)",
        source_label,
        target.host(),
        options.concurrency,
        options.request_timeout.as_millis()
    );
    let executor = RequestExecutor::new(fetcher, target, options.request_timeout);

    let state = Arc::new(DispatchState::new());
    let signal_handler = setup_signal_stop_handler(&state);
    let result = run_replay(source, executor, options, Arc::clone(&state)).await;
    signal_handler.abort();
    let summary = result?;

    if !args.quiet {
        print_summary(&summary, source_label);
    }
    if let Some(path) = args.summary_json.as_deref() {
        export_summary_json(path, &summary, source_label).await?;
        info!("Summary written to {}", path.display());
    }
    Ok(summary)
}
