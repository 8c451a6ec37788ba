use thiserror::Error;

use crate::canonical::CanonicalizeError;

#[derive(Error, Debug)]
pub enum StorywireError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Canonicalization error: {0}")]
    Canonicalize(#[from] CanonicalizeError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown source kind: {0}")]
    UnknownKind(String),

    #[error("Source task for {source_name} exceeded its {secs}s deadline")]
    DeadlineExceeded { source_name: String, secs: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StorywireError>;
