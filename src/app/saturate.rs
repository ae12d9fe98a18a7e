use tracing::info;

use crate::args::{ReplayArgs, SaturateArgs};
use crate::error::AppResult;
use crate::metrics::RunSummary;
use crate::records::RepeatRecordSource;

use super::start::replay_source;

/// Fetches one CID as fast as the worker pool allows until the gateway
/// answers with a non-2xx status, the run is interrupted, or the optional
/// request cap is reached.
pub(crate) async fn run_saturate(
    args: &ReplayArgs,
    saturate: &SaturateArgs,
) -> AppResult<RunSummary> {
    let url = args.gateway_target()?.url_for(&saturate.cid, &saturate.path);
    let limit = saturate
        .max_requests
        .map(|max| u64::try_from(max.get()).unwrap_or(u64::MAX));
    info!("Fetching {} repeatedly until rate-limited", url);
    let source = RepeatRecordSource::new(&saturate.cid, &saturate.path, limit);
    replay_source(args, source, &url).await
}
