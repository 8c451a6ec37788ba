use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::app::Result;
use crate::store::{lock, open_connection, open_in_memory, DedupStore};

/// Source of "now" for expiry checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Seen-URL cache with per-key expiry, backed by SQLite.
///
/// A record is live while `expires_at` is strictly in the future.
pub struct SqliteDedupStore {
    conn: Mutex<Connection>,
    clock: Clock,
}

impl SqliteDedupStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
            clock: Arc::new(Utc::now),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_in_memory()?),
            clock: Arc::new(Utc::now),
        })
    }

    /// Replace the wall clock used by the [`DedupStore`] methods.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn exists_at(&self, key: &str, now: DateTime<Utc>) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let found = conn
            .query_row(
                "SELECT 1 FROM seen_urls WHERE url = ?1 AND expires_at > ?2",
                params![key, now.timestamp()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn mark_seen_at(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<()> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now.timestamp().saturating_add(ttl_secs);
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO seen_urls (url, expires_at) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET expires_at = excluded.expires_at",
            params![key, expires_at],
        )?;
        Ok(())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let removed = conn.execute(
            "DELETE FROM seen_urls WHERE expires_at <= ?1",
            params![now.timestamp()],
        )?;
        Ok(removed)
    }

    /// Number of records, live or not yet purged.
    pub fn len(&self) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM seen_urls", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists_at(key, self.now())
    }

    async fn mark_seen(&self, key: &str, ttl: Duration) -> Result<()> {
        self.mark_seen_at(key, ttl, self.now())
    }

    async fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(self.now())
    }
}
