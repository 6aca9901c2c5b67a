//! Result cache — persisted snapshots of fetched KV subtrees.
//!
//! Snapshots live in a single redb database under the configured cache
//! directory. Every operation opens the database, runs exactly one
//! transaction and releases it again, so several `consul_search` processes
//! can share one cache directory. redb holds an exclusive file lock while a
//! handle is open; an open that loses the race retries briefly before giving
//! up with [`CacheError::Busy`].

use crate::config::ConsulConfig;
use crate::error::CacheError;
use crate::types::{CachePayload, SearchField};
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Snapshot table: cache key → JSON-encoded [`CacheRecord`].
const SNAPSHOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

const DB_FILE: &str = "consul-search.redb";

const OPEN_ATTEMPTS: u32 = 250;
const OPEN_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Derive the cache key for a search: `host:port:root:field`.
pub fn cache_key(consul: &ConsulConfig, root: &str, field: SearchField) -> String {
    let (host, port) = consul.cache_target();
    format!("{host}:{port}:{root}:{field}")
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    expires_at_ms: i64,
    payload: CachePayload,
}

#[derive(Serialize)]
struct CacheRecordRef<'a> {
    expires_at_ms: i64,
    payload: &'a CachePayload,
}

/// An open cache database. Dropping it releases the file lock.
struct CacheHandle {
    db: redb::Database,
    path: PathBuf,
}

impl Drop for CacheHandle {
    fn drop(&mut self) {
        tracing::trace!(path = %self.path.display(), "cache released");
    }
}

/// Persistent, TTL-bounded store of KV snapshots keyed by [`cache_key`].
#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.join(DB_FILE)
    }

    /// Return the snapshot stored under `key`, or `None` when it was never
    /// stored or has expired.
    pub fn get(&self, key: &str) -> Result<Option<CachePayload>, CacheError> {
        self.get_at(key, now_ms())
    }

    /// Store `payload` under `key`, replacing any previous snapshot. A
    /// `ttl_secs` of zero or less stores an already-expired record.
    pub fn put(&self, key: &str, payload: &CachePayload, ttl_secs: i64) -> Result<(), CacheError> {
        self.put_at(key, payload, ttl_secs, now_ms())
    }

    /// Drop every snapshot, expired or not.
    pub fn clear_all(&self) -> Result<(), CacheError> {
        let handle = self.open()?;
        let txn = handle.db.begin_write()?;
        let existed = txn.delete_table(SNAPSHOTS)?;
        txn.commit()?;
        tracing::debug!(path = %handle.path.display(), existed, "cache cleared");
        Ok(())
    }

    fn get_at(&self, key: &str, now_ms: i64) -> Result<Option<CachePayload>, CacheError> {
        let handle = self.open()?;
        let txn = handle.db.begin_read()?;
        let table = match txn.open_table(SNAPSHOTS) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let Some(guard) = table.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_slice::<CacheRecord>(guard.value()) {
            Ok(record) if now_ms < record.expires_at_ms => Ok(Some(record.payload)),
            Ok(_) => {
                tracing::debug!(key, "cache entry expired");
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "unreadable cache entry, ignoring");
                Ok(None)
            }
        }
    }

    fn put_at(
        &self,
        key: &str,
        payload: &CachePayload,
        ttl_secs: i64,
        now_ms: i64,
    ) -> Result<(), CacheError> {
        let expires_at_ms = now_ms.saturating_add(ttl_secs.saturating_mul(1000));
        let bytes = serde_json::to_vec(&CacheRecordRef {
            expires_at_ms,
            payload,
        })?;

        let handle = self.open()?;
        let txn = handle.db.begin_write()?;
        {
            let mut table = txn.open_table(SNAPSHOTS)?;

            let mut stale = Vec::new();
            for item in table.iter()? {
                let (stored_key, stored) = item?;
                let expired = serde_json::from_slice::<CacheRecord>(stored.value())
                    .map(|record| record.expires_at_ms <= now_ms)
                    .unwrap_or(true);
                if expired && stored_key.value() != key {
                    stale.push(stored_key.value().to_string());
                }
            }
            for stale_key in &stale {
                table.remove(stale_key.as_str())?;
            }
            if !stale.is_empty() {
                tracing::debug!(evicted = stale.len(), "evicted expired cache entries");
            }

            table.insert(key, bytes.as_slice())?;
        }
        txn.commit()?;

        tracing::debug!(key, items = payload.len(), ttl_secs, "cache entry stored");
        Ok(())
    }

    fn open(&self) -> Result<CacheHandle, CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.db_path();
        for attempt in 1..=OPEN_ATTEMPTS {
            match redb::Database::create(&path) {
                Ok(db) => return Ok(CacheHandle { db, path }),
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    tracing::trace!(attempt, path = %path.display(), "cache busy, retrying");
                    std::thread::sleep(OPEN_RETRY_DELAY);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(CacheError::Busy { path })
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
