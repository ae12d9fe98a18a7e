//! Core library for the `gateway-replay` CLI.
//!
//! Replays recorded IPFS gateway fetches against a live gateway while keeping
//! their original relative timing, bounds concurrency and queue depth, stops
//! on the first rate-limit response, and reports latency statistics. The
//! primary user-facing interface is the `gateway-replay` command-line
//! application; library APIs may evolve as the CLI grows.
mod app;
mod entry;
mod system;

pub mod args;
pub mod cid;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod records;
pub mod replay;

pub use entry::run;
