//! Test doubles for the pipeline's external collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, StorywireError};
use crate::domain::{OutboundMessage, RawItem};
use crate::fetcher::Fetcher;
use crate::store::{DedupStore, Publisher, SqliteDedupStore, SqliteQueue};

enum Response {
    Items(Vec<RawItem>),
    Error(String),
    Hang,
}

/// Serves canned feeds by address. Unknown addresses return no items.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Response>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, usize, Duration)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, address: &str, items: Vec<RawItem>) -> Self {
        self.responses
            .insert(address.to_string(), Response::Items(items));
        self
    }

    pub fn with_error(mut self, address: &str, error: &str) -> Self {
        self.responses
            .insert(address.to_string(), Response::Error(error.to_string()));
        self
    }

    pub fn with_hang(mut self, address: &str) -> Self {
        self.responses.insert(address.to_string(), Response::Hang);
        self
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, usize, Duration)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        address: &str,
        max_items: usize,
        timeout: Duration,
    ) -> Result<Vec<RawItem>> {
        self.calls
            .lock()
            .unwrap()
            .push((address.to_string(), max_items, timeout));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.responses.get(address) {
            Some(Response::Items(items)) => Ok(items.iter().take(max_items).cloned().collect()),
            Some(Response::Error(e)) => Err(StorywireError::Other(e.clone())),
            Some(Response::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A queue that is never reachable.
#[derive(Default)]
pub struct FailingPublisher {
    attempts: AtomicUsize,
}

impl FailingPublisher {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _message: &OutboundMessage, _durable: bool) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorywireError::Other("queue unreachable".into()))
    }
}

/// In-memory cache that errors on one key.
pub struct FlakyDedup {
    inner: SqliteDedupStore,
    broken_key: String,
}

impl FlakyDedup {
    pub fn failing_on(key: &str) -> Self {
        Self {
            inner: SqliteDedupStore::in_memory().unwrap(),
            broken_key: key.to_string(),
        }
    }
}

#[async_trait]
impl DedupStore for FlakyDedup {
    async fn exists(&self, key: &str) -> Result<bool> {
        if key == self.broken_key {
            return Err(StorywireError::Other("cache unreachable".into()));
        }
        self.inner.exists(key).await
    }

    async fn mark_seen(&self, key: &str, ttl: Duration) -> Result<()> {
        self.inner.mark_seen(key, ttl).await
    }
}

/// URLs of everything published to `queue`, oldest first.
pub fn published_urls(queue: &SqliteQueue) -> Vec<String> {
    queue
        .pending(usize::MAX >> 1)
        .unwrap()
        .into_iter()
        .map(|m| serde_json::from_str::<OutboundMessage>(&m.body).unwrap().url)
        .collect()
}
