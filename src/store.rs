//! Key-Value Store Module
//!
//! Sequences the cache and the session pool so that durable state leads and
//! the cache follows: writes and deletes go to the backend first and touch
//! the cache only on success, reads consult the cache and fall back to the
//! backend, installing what they find.
//!
//! Between a backend commit and the matching cache update there is a window
//! in which a concurrent reader can observe the previous value. That window
//! is accepted; what is never possible is the cache advertising a value the
//! backend did not durably hold at some point.

use tracing::{debug, warn};

use crate::cache::{CacheState, CacheStats, LruCache, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::db::{BackendSession, SessionPool};
use crate::error::{KvError, Result};

// == Read Source ==
/// A successful read, tagged with where the value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadSource {
    Cache(String),
    Backend(String),
}

// == KV Store ==
/// The store shared by all request workers: one cache, one session pool.
pub struct KvStore<S: BackendSession> {
    cache: LruCache,
    pool: SessionPool<S>,
}

impl<S: BackendSession> KvStore<S> {
    // == Constructor ==
    pub fn new(cache: LruCache, pool: SessionPool<S>) -> Self {
        Self { cache, pool }
    }

    // == Create ==
    /// Write-through upsert: backend first, cache second.
    ///
    /// A backend failure leaves the cache exactly as it was.
    pub async fn create(&self, key: String, value: String) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(KvError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let session = self.pool.acquire().await;
        session.upsert(&key, &value).await.map_err(|e| {
            warn!(key = %key, error = %e, "write-through upsert failed");
            KvError::Backend(e)
        })?;
        drop(session);

        debug!(key = %key, "write-through upsert committed");
        self.cache.put(key, value);
        Ok(())
    }

    // == Read ==
    /// Read-through lookup: cache first, backend on miss.
    ///
    /// A value found in the backend is installed in the cache before the
    /// call returns; a definite absence leaves the cache untouched. Backend
    /// read failures are logged and reported as not found.
    pub async fn read(&self, key: &str) -> Result<ReadSource> {
        if let Some(value) = self.cache.get(key) {
            debug!(key, "cache hit");
            return Ok(ReadSource::Cache(value));
        }

        debug!(key, "cache miss, consulting backend");
        let session = self.pool.acquire().await;
        let fetched = session.fetch(key).await;
        drop(session);

        match fetched {
            Ok(Some(value)) => {
                self.cache.put(key.to_string(), value.clone());
                Ok(ReadSource::Backend(value))
            }
            Ok(None) => Err(KvError::NotFound),
            Err(e) => {
                warn!(key, error = %e, "backend read failed, reporting not found");
                Err(KvError::NotFound)
            }
        }
    }

    // == Delete ==
    /// Delete-through: backend first, cache second.
    ///
    /// A backend failure leaves any cached entry in place; deleting an
    /// absent key succeeds.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let session = self.pool.acquire().await;
        session.delete(key).await.map_err(|e| {
            warn!(key, error = %e, "delete-through failed");
            KvError::Backend(e)
        })?;
        drop(session);

        debug!(key, "delete-through committed");
        self.cache.remove(key);
        Ok(())
    }

    // == Observation ==
    /// Point-in-time copy of the cache contents.
    pub fn cache_state(&self) -> CacheState {
        self.cache.snapshot()
    }

    /// Cache hit/miss/eviction counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The session pool, for health reporting.
    pub fn pool(&self) -> &SessionPool<S> {
        &self.pool
    }

    // == Shutdown ==
    /// Closes the pool's sessions. Called once, after the listener stops.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
