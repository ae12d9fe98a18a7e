use std::path::PathBuf;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, ReplayArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the
/// command line (not from defaults or the environment) always win.
///
/// # Errors
///
/// Returns an error when a config value is out of range or not a valid
/// duration.
pub fn apply_config(
    args: &mut ReplayArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "gateway_host")
        && let Some(host) = config.gateway_host.clone()
    {
        args.gateway_host = Some(host);
    }

    if !is_cli(matches, "gateway_scheme")
        && let Some(scheme) = config.gateway_scheme
    {
        args.gateway_scheme = scheme;
    }

    if !is_cli(matches, "url_style")
        && let Some(style) = config.url_style
    {
        args.url_style = style;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "queue_high")
        && let Some(high) = config.queue_high
    {
        args.queue_high = ensure_positive_usize(high, "queue_high")?;
    }

    if !is_cli(matches, "queue_low")
        && let Some(low) = config.queue_low
    {
        args.queue_low = low;
    }

    if !is_cli(matches, "min_spacing")
        && let Some(spacing) = config.min_spacing.as_ref()
    {
        args.min_spacing = spacing.to_duration_or_zero("min_spacing")?;
    }

    if !is_cli(matches, "spacing_penalty")
        && let Some(penalty) = config.spacing_penalty.as_ref()
    {
        args.spacing_penalty = penalty.to_duration_or_zero("spacing_penalty")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration("timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout.to_duration("connect_timeout")?;
    }

    if !is_cli(matches, "progress_interval")
        && let Some(interval) = config.progress_interval.as_ref()
    {
        args.progress_interval = interval.to_duration_or_zero("progress_interval")?;
    }

    if !is_cli(matches, "redirect_limit")
        && let Some(redirect) = config.redirect
    {
        args.redirect_limit = redirect;
    }

    if !is_cli(matches, "summary_json")
        && let Some(path) = config.summary_json.as_ref()
    {
        args.summary_json = Some(PathBuf::from(path));
    }

    apply_flag(matches, "drain_body", config.drain_body, &mut args.drain_body);
    apply_flag(
        matches,
        "disable_keepalive",
        config.disable_keepalive,
        &mut args.disable_keepalive,
    );
    apply_flag(matches, "insecure", config.insecure, &mut args.insecure);
    apply_flag(matches, "no_ua", config.no_ua, &mut args.no_ua);
    apply_flag(matches, "quiet", config.quiet, &mut args.quiet);
    apply_flag(matches, "verbose", config.verbose, &mut args.verbose);
    apply_flag(matches, "no_color", config.no_color, &mut args.no_color);

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn apply_flag(matches: &ArgMatches, name: &str, value: Option<bool>, target: &mut bool) {
    if !is_cli(matches, name)
        && let Some(value) = value
    {
        *target = value;
    }
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
