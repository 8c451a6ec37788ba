//! One cycle's worth of work: a [`SourceTask`] per source, run on a bounded
//! [`WorkerPool`].
//!
//! ```text
//! Fetcher → canonicalize → DedupStore::exists → Publisher::publish → DedupStore::mark_seen
//! ```
//!
//! Tasks share nothing in-process except the store handles they are given,
//! so two sources yielding the same canonical URL in one cycle can both see
//! it as new and both publish it.

pub mod pool;
pub mod task;

pub use pool::{CycleReport, SourceOutcome, WorkerPool, DEFAULT_WORKERS};
pub use task::{ItemOutcome, SourceReport, SourceTask, TaskSettings};
