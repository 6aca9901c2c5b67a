//! Error taxonomy for the search core.
//!
//! Only per-entry match failures are recovered inside the engine (see
//! [`SkipReason`]); everything here propagates to the caller.

use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to read from the KV store.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("invalid Consul target: {0}")]
    InvalidTarget(String),

    #[error("failed to reach Consul at {target}: {source}")]
    Transport {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {target} timed out after {secs}s")]
    Timeout { target: String, secs: u64 },

    #[error("Consul returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("malformed KV response: {0}")]
    Malformed(String),
}

/// Failure of the persistent result cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache database is held by another process: {path}")]
    Busy { path: PathBuf },

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("failed to encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Anything that aborts a whole search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Connectivity(#[from] KvError),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Why a single entry was left out of the results without failing the search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("value of {key} is not UTF-8 text ({len} bytes)")]
    NotText { key: String, len: usize },
}
