use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{run_saturate, run_split, run_start, run_start_w3, run_transform};
use crate::args::{Command, ReplayArgs};
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::AppResult;

#[cfg(test)]
mod tests;

/// Parses the command line, applies the config file and runs the chosen
/// subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns any error raised while loading configuration or running the
/// subcommand.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<(ReplayArgs, ArgMatches)>> {
    let mut cmd = ReplayArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = ReplayArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    is_bare_invocation(raw_args) && !has_default_config()
}

fn is_bare_invocation(raw_args: &[OsString]) -> bool {
    matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--")
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(args: ReplayArgs) -> AppResult<()> {
    match &args.command {
        Command::Start(start) => {
            run_start(&args, &start.input).await?;
        }
        Command::StartW3(start) => {
            run_start_w3(&args, &start.cid, &start.file_name).await?;
        }
        Command::Saturate(saturate) => {
            run_saturate(&args, saturate).await?;
        }
        Command::Split(split) => {
            run_split(split).await?;
        }
        Command::Transform(transform) => {
            run_transform(transform).await?;
        }
    }
    Ok(())
}
