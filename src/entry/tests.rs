use std::ffi::OsString;

use super::is_bare_invocation;
use crate::error::{AppError, AppResult};

fn os_args(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

#[test]
fn bare_invocation_detects_empty_command_lines() -> AppResult<()> {
    if !is_bare_invocation(&os_args(&["gateway-replay"])) {
        return Err(AppError::validation("program name alone should be bare"));
    }
    if !is_bare_invocation(&os_args(&["gateway-replay", "--"])) {
        return Err(AppError::validation("trailing -- should be bare"));
    }
    if !is_bare_invocation(&[]) {
        return Err(AppError::validation("empty argv should be bare"));
    }
    Ok(())
}

#[test]
fn bare_invocation_ignores_real_arguments() -> AppResult<()> {
    if is_bare_invocation(&os_args(&["gateway-replay", "start", "input.csv"])) {
        return Err(AppError::validation("subcommand invocation is not bare"));
    }
    if is_bare_invocation(&os_args(&["gateway-replay", "--verbose"])) {
        return Err(AppError::validation("flag invocation is not bare"));
    }
    Ok(())
}
