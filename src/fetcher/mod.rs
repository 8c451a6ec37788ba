pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::RawItem;

/// Number of entries read from a single feed per cycle.
pub const MAX_ITEMS: usize = 100;

/// Per-request bound on a feed fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Fetcher {
    /// Fetch and parse the feed at `address`. Network, timeout and parse
    /// failures are all reported as errors; the caller decides what a failed
    /// source means for the cycle.
    async fn fetch(&self, address: &str, max_items: usize, timeout: Duration)
        -> Result<Vec<RawItem>>;
}
