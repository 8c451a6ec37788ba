pub mod dedup;
pub mod queue;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, StorywireError};
use crate::domain::OutboundMessage;

pub use dedup::{Clock, SqliteDedupStore};
pub use queue::{QueuedMessage, SqliteQueue};

/// How long a published URL stays suppressed (3 days).
pub const DEDUP_TTL: Duration = Duration::from_secs(259_200);

/// Queue consumed by the article scraper.
pub const SCRAPER_QUEUE: &str = "scraper_queue";

/// Seen-URL cache shared by every source task.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Record `key` as seen until `ttl` from now, refreshing any live record.
    async fn mark_seen(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Drop expired records. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }
}

/// Hands messages to the downstream work queue. No acknowledgement is
/// awaited and nothing is retried.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// `durable` asks the queue to keep the message across restarts.
    async fn publish(&self, message: &OutboundMessage, durable: bool) -> Result<()>;
}

pub(crate) fn open_connection<P: AsRef<Path>>(path: P) -> Result<Connection> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = Connection::open(path)?;
    run_migrations(&mut conn)?;
    Ok(conn)
}

pub(crate) fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    run_migrations(&mut conn)?;
    Ok(conn)
}

fn run_migrations(conn: &mut Connection) -> Result<()> {
    let migrations = Migrations::new(vec![M::up(include_str!(
        "../../migrations/001-initial/up.sql"
    ))]);

    // Cache and queue may share a file and be opened concurrently.
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations.to_latest(conn)?;
    Ok(())
}

pub(crate) fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StorywireError::Other(format!("Database lock poisoned: {}", e)))
}
