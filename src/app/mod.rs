//! Subcommand handlers and run reporting.
mod export;
mod saturate;
mod split;
mod start;
mod summary;
mod transform;


pub(crate) use saturate::run_saturate;
pub(crate) use split::run_split;
pub(crate) use start::{run_start, run_start_w3};
pub(crate) use transform::run_transform;
