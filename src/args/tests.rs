use super::test_support::parse_test_args;
use super::*;
use crate::args::parsers::{parse_duration_arg, parse_duration_or_zero};
use crate::error::{AppError, AppResult};
use std::time::Duration;

mod options;
