use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{FetchError, FetchResponse, GatewayFetcher};

/// What a scripted call does.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Status { status: u16, after: Duration },
    Hang,
    TransportError,
}

impl Reply {
    pub(crate) const fn ok_after(millis: u64) -> Self {
        Self::Status {
            status: 200,
            after: Duration::from_millis(millis),
        }
    }
}

/// Fake gateway: answers per call index, records call order, and tracks how
/// many calls were in flight at once.
#[derive(Debug)]
pub(crate) struct ScriptedFetcher {
    default: Reply,
    overrides: BTreeMap<usize, Reply>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new(default: Reply) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Makes the `index`-th call (0-based, in start order) reply differently.
    pub(crate) fn with_reply(mut self, index: usize, reply: Reply) -> Self {
        self.overrides.insert(index, reply);
        self
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub(crate) fn started_at(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'fetcher> {
    counter: &'fetcher AtomicUsize,
}

impl<'fetcher> InFlight<'fetcher> {
    fn enter(fetcher: &'fetcher ScriptedFetcher) -> Self {
        let now = fetcher
            .in_flight
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        fetcher.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            counter: &fetcher.in_flight,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GatewayFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let index = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push((url.to_owned(), Instant::now()));
            calls.len().saturating_sub(1)
        };
        let reply = self.overrides.get(&index).copied().unwrap_or(self.default);
        let _guard = InFlight::enter(self);
        match reply {
            Reply::Status { status, after } => {
                tokio::time::sleep(after).await;
                Ok(FetchResponse {
                    status,
                    received_at: Instant::now(),
                })
            }
            Reply::Hang => std::future::pending().await,
            Reply::TransportError => Err(FetchError::Transport {
                message: "connection refused".to_owned(),
            }),
        }
    }
}
