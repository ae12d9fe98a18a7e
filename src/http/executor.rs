use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics::ExecutionOutcome;
use crate::records::RequestRecord;

use super::GatewayTarget;

/// A response whose status line has arrived.
#[derive(Debug, Clone, Copy)]
pub struct FetchResponse {
    pub status: u16,
    /// When the status became known; latency is measured up to here.
    pub received_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Timeout,
    Transport { message: String },
}

/// Issues a single GET against the gateway.
#[async_trait]
pub trait GatewayFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// reqwest-backed fetcher used outside tests.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    drain_body: bool,
}

impl ReqwestFetcher {
    #[must_use]
    pub const fn new(client: Client, drain_body: bool) -> Self {
        Self { client, drain_body }
    }
}

#[async_trait]
impl GatewayFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;
        let received = FetchResponse {
            status: response.status().as_u16(),
            received_at: Instant::now(),
        };
        if self.drain_body {
            drain_response_body(response)
                .await
                .map_err(classify_reqwest_error)?;
        }
        Ok(received)
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport {
            message: err.to_string(),
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// Turns a record into one deadline-bound gateway request and classifies the
/// result. Never fails; every failure mode is an [`ExecutionOutcome`].
#[derive(Clone)]
pub struct RequestExecutor {
    fetcher: Arc<dyn GatewayFetcher>,
    target: GatewayTarget,
    timeout: Duration,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(fetcher: Arc<dyn GatewayFetcher>, target: GatewayTarget, timeout: Duration) -> Self {
        Self {
            fetcher,
            target,
            timeout,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn execute(&self, record: &RequestRecord) -> ExecutionOutcome {
        let url = self.target.url_for(&record.cid, &record.path);
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(Ok(response)) => {
                let latency_ms =
                    u64::try_from(response.received_at.saturating_duration_since(start).as_millis())
                        .unwrap_or(u64::MAX);
                ExecutionOutcome::from_status(response.status, latency_ms)
            }
            Ok(Err(FetchError::Timeout)) | Err(_) => {
                debug!(
                    "Request #{} to {} exceeded {}ms",
                    record.seq,
                    url,
                    self.timeout.as_millis()
                );
                ExecutionOutcome::Timeout
            }
            Ok(Err(FetchError::Transport { message })) => {
                warn!("Request #{} to {} failed: {}", record.seq, url, message);
                ExecutionOutcome::NetworkError
            }
        }
    }
}
