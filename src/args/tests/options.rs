use super::*;

#[test]
fn defaults_match_engine_defaults() -> AppResult<()> {
    let args = parse_test_args(["gateway-replay", "start", "input.csv"])?;
    let options = args.replay_options()?;
    if options != crate::replay::ReplayOptions::default() {
        return Err(AppError::validation(format!(
            "unexpected defaults {:?}",
            options
        )));
    }
    if args.gateway_scheme != GatewayScheme::Https || args.url_style != UrlStyle::Subdomain {
        return Err(AppError::validation("unexpected url defaults"));
    }
    Ok(())
}

#[test]
fn global_options_after_subcommand() -> AppResult<()> {
    let args = parse_test_args([
        "gateway-replay",
        "start",
        "input.csv",
        "--gateway-host",
        "127.0.0.1:8080",
        "--gateway-scheme",
        "http",
        "--url-style",
        "path",
        "-c",
        "4",
        "--timeout",
        "2s",
        "--progress-interval",
        "0",
    ])?;
    let options = args.replay_options()?;
    if options.concurrency != 4
        || options.request_timeout != Duration::from_secs(2)
        || options.progress_interval.is_some()
    {
        return Err(AppError::validation(format!("unexpected options {:?}", options)));
    }
    let target = args.gateway_target()?;
    let url = target.url_for("raw", "/a");
    if url != "http://127.0.0.1:8080/ipfs/raw/a" {
        return Err(AppError::validation(format!("unexpected url {}", url)));
    }
    Ok(())
}

#[test]
fn inverted_watermarks_are_rejected() -> AppResult<()> {
    let args = parse_test_args([
        "gateway-replay",
        "start",
        "input.csv",
        "--queue-high",
        "100",
        "--queue-low",
        "100",
    ])?;
    match args.replay_options() {
        Err(AppError::Validation(crate::error::ValidationError::WatermarksInverted {
            low: 100,
            high: 100,
        })) => Ok(()),
        other => Err(AppError::validation(format!("unexpected {:?}", other))),
    }
}

#[test]
fn zero_concurrency_is_a_parse_error() -> AppResult<()> {
    if parse_test_args(["gateway-replay", "start", "input.csv", "-c", "0"]).is_ok() {
        return Err(AppError::validation("concurrency 0 accepted"));
    }
    Ok(())
}
