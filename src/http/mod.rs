//! Gateway client construction, request targets, and the deadline-bound
//! request executor.
mod client;
mod download;
mod executor;
mod target;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientSettings, build_client};
pub use download::download_to_file;
pub use executor::{
    FetchError, FetchResponse, GatewayFetcher, RequestExecutor, ReqwestFetcher,
};
pub use target::GatewayTarget;
