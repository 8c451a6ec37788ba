use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::Result;
use crate::canonical::canonicalize;
use crate::domain::{OutboundMessage, RawItem, Source};
use crate::fetcher::{Fetcher, FETCH_TIMEOUT, MAX_ITEMS};
use crate::store::{DedupStore, Publisher, DEDUP_TTL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSettings {
    pub max_items: usize,
    pub fetch_timeout: Duration,
    pub dedup_ttl: Duration,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            fetch_timeout: FETCH_TIMEOUT,
            dedup_ttl: DEDUP_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Published,
    AlreadySeen,
}

/// What one source did during one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub fetched: usize,
    pub published: usize,
    pub already_seen: usize,
    /// Items abandoned for this cycle: canonicalization, cache or publish failure.
    pub dropped: usize,
    /// Set when the feed could not be fetched; the source then has no items.
    pub fetch_error: Option<String>,
}

/// Fetch, dedup and publish for a single source.
pub struct SourceTask {
    source: Source,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    dedup: Arc<dyn DedupStore>,
    publisher: Arc<dyn Publisher>,
    settings: TaskSettings,
}

impl SourceTask {
    pub fn new(
        source: Source,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        dedup: Arc<dyn DedupStore>,
        publisher: Arc<dyn Publisher>,
        settings: TaskSettings,
    ) -> Self {
        Self {
            source,
            fetcher,
            dedup,
            publisher,
            settings,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Never fails: fetch errors yield zero items and item errors drop only
    /// that item.
    pub async fn run(self) -> SourceReport {
        info!(source = %self.source.name, "Processing source");
        let mut report = SourceReport::default();

        let items = match self
            .fetcher
            .fetch(
                &self.source.address,
                self.settings.max_items,
                self.settings.fetch_timeout,
            )
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    source = %self.source.name,
                    address = %self.source.address,
                    error = %e,
                    "Problem fetching feed"
                );
                report.fetch_error = Some(e.to_string());
                return report;
            }
        };

        report.fetched = items.len();
        if items.is_empty() {
            warn!(source = %self.source.name, "No results");
            return report;
        }

        for item in &items {
            match self.process_item(item).await {
                Ok(ItemOutcome::Published) => report.published += 1,
                Ok(ItemOutcome::AlreadySeen) => report.already_seen += 1,
                Err(e) => {
                    warn!(
                        source = %self.source.name,
                        url = %item.raw_url,
                        error = %e,
                        "Dropping item"
                    );
                    report.dropped += 1;
                }
            }
        }

        debug!(
            source = %self.source.name,
            published = report.published,
            already_seen = report.already_seen,
            dropped = report.dropped,
            "Source done"
        );
        report
    }

    /// Publish and mark-seen are separate calls: a failure between them
    /// leaves the message published but not recorded.
    pub async fn process_item(&self, item: &RawItem) -> Result<ItemOutcome> {
        let url = canonicalize(&item.raw_url, self.source.kind)?;

        if self.dedup.exists(&url).await? {
            return Ok(ItemOutcome::AlreadySeen);
        }

        let message = OutboundMessage::new(&self.source, item, &url);
        self.publisher.publish(&message, true).await?;
        self.dedup.mark_seen(&url, self.settings.dedup_ttl).await?;

        Ok(ItemOutcome::Published)
    }
}
