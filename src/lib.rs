//! # Storywire
//!
//! Polls a fixed set of news feeds, drops stories it has already seen, and
//! queues the rest for an external article scraper.
//!
//! ## Architecture
//!
//! ```text
//! Daemon → WorkerPool → SourceTask: Fetcher → canonicalize → DedupStore → Publisher
//! ```
//!
//! Every cycle runs one [`SourceTask`](pipeline::SourceTask) per source on a
//! pool of 30 workers, waits for all of them, then sleeps 30 minutes.
//! Published URLs are suppressed for three days. Suppression is best-effort:
//! two sources producing the same canonical URL in the same cycle may both
//! publish it.

/// Application context and error handling.
pub mod app;

/// Source-specific URL canonicalization and the kind registry.
pub mod canonical;

/// Command-line interface using clap.
pub mod cli;

/// Configuration file and feed whitelist loading.
pub mod config;

/// The cycle driver.
pub mod daemon;

/// Core domain models.
///
/// - [`Source`](domain::Source): a configured feed
/// - [`RawItem`](domain::RawItem): a story candidate from a feed
/// - [`OutboundMessage`](domain::OutboundMessage): the queue wire format
pub mod domain;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Feed parsing into [`RawItem`](domain::RawItem)s.
pub mod normalizer;

/// Source tasks and the bounded worker pool.
pub mod pipeline;

/// Dedup cache and work queue.
///
/// - [`DedupStore`](store::DedupStore) / [`SqliteDedupStore`](store::SqliteDedupStore)
/// - [`Publisher`](store::Publisher) / [`SqliteQueue`](store::SqliteQueue)
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
