use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::app::Result;
use crate::domain::OutboundMessage;
use crate::store::{lock, open_connection, open_in_memory, Publisher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub id: i64,
    pub body: String,
    pub durable: bool,
    pub enqueued_at: Option<DateTime<Utc>>,
}

/// A single named work queue stored in SQLite.
pub struct SqliteQueue {
    conn: Mutex<Connection>,
    queue: String,
}

impl SqliteQueue {
    pub fn new<P: AsRef<Path>>(path: P, queue: impl Into<String>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
            queue: queue.into(),
        })
    }

    pub fn in_memory(queue: impl Into<String>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_in_memory()?),
            queue: queue.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.queue
    }

    pub fn enqueue(&self, body: &str, durable: bool) -> Result<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO queue_messages (queue, body, persistent, enqueued_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                self.queue,
                body,
                durable,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Oldest messages first, up to `limit`.
    pub fn pending(&self, limit: usize) -> Result<Vec<QueuedMessage>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, body, persistent, enqueued_at FROM queue_messages
             WHERE queue = ?1 ORDER BY id LIMIT ?2",
        )?;

        let messages = stmt
            .query_map(params![self.queue, limit as i64], |row| {
                Ok(QueuedMessage {
                    id: row.get(0)?,
                    body: row.get(1)?,
                    durable: row.get(2)?,
                    enqueued_at: row
                        .get::<_, String>(3)
                        .ok()
                        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                        .map(|dt| dt.with_timezone(&Utc)),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    pub fn depth(&self) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM queue_messages WHERE queue = ?1",
            params![self.queue],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl Publisher for SqliteQueue {
    async fn publish(&self, message: &OutboundMessage, durable: bool) -> Result<()> {
        let body = message.to_json()?;
        let id = self.enqueue(&body, durable)?;
        tracing::trace!(queue = %self.queue, id, url = %message.url, "Enqueued message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SCRAPER_QUEUE;

    fn message(url: &str) -> OutboundMessage {
        OutboundMessage {
            address: "http://cnn.com/rss".into(),
            website: "cnn".into(),
            lang: "en".into(),
            title: "Title".into(),
            date: "".into(),
            url: url.into(),
        }
    }

    #[tokio::test]
    async fn test_publish_is_durable_json() {
        let queue = SqliteQueue::in_memory(SCRAPER_QUEUE).unwrap();
        queue
            .publish(&message("http://cnn.com/a"), true)
            .await
            .unwrap();

        let pending = queue.pending(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].durable);
        assert!(pending[0].enqueued_at.is_some());

        let decoded: OutboundMessage = serde_json::from_str(&pending[0].body).unwrap();
        assert_eq!(decoded, message("http://cnn.com/a"));
    }

    #[tokio::test]
    async fn test_pending_preserves_publish_order() {
        let queue = SqliteQueue::in_memory(SCRAPER_QUEUE).unwrap();
        for url in ["http://a", "http://b", "http://c"] {
            queue.publish(&message(url), true).await.unwrap();
        }

        let urls: Vec<String> = queue
            .pending(2)
            .unwrap()
            .into_iter()
            .map(|m| serde_json::from_str::<OutboundMessage>(&m.body).unwrap().url)
            .collect();
        assert_eq!(urls, vec!["http://a", "http://b"]);
        assert_eq!(queue.depth().unwrap(), 3);
    }

    #[test]
    fn test_queues_sharing_a_file_are_separate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");

        let scraper = SqliteQueue::new(&path, SCRAPER_QUEUE).unwrap();
        let other = SqliteQueue::new(&path, "other_queue").unwrap();
        scraper.enqueue("{}", true).unwrap();

        assert_eq!(scraper.depth().unwrap(), 1);
        assert_eq!(other.depth().unwrap(), 0);
    }
}
