//! Backend Session Abstraction
//!
//! The pool and the store coordinate against this trait rather than a
//! concrete client, so the key-value logic can be exercised against an
//! in-memory backend in tests while production runs on PostgreSQL.

use async_trait::async_trait;
use thiserror::Error;

// == Backend Error ==
/// Failure reported by a backend session.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The session could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// A statement failed on an established session
    #[error("query failed: {0}")]
    Query(String),
}

// == Backend Session ==
/// One exclusive, reusable handle to the durable backend.
///
/// A session executes one statement at a time and is owned by at most one
/// worker while borrowed from the pool. Reads are tri-state: a value, a
/// definite absence, or a failure.
#[async_trait]
pub trait BackendSession: Send + Sync + Sized + 'static {
    /// Parameters used to establish and to repair sessions.
    type Params: Clone + Send + Sync + 'static;

    /// Establishes a fresh session.
    async fn connect(params: &Self::Params) -> Result<Self, BackendError>;

    /// Cheap liveness probe, called by the pool on handout.
    fn is_healthy(&self) -> bool;

    /// One repair attempt for a session whose connection has dropped.
    ///
    /// The outcome is deliberately not reported: if the repair failed, the
    /// next statement fails cleanly and the caller surfaces that instead.
    async fn reset(&mut self, params: &Self::Params);

    /// Inserts `key` or replaces its value.
    async fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Looks up `key`, distinguishing absence from failure.
    async fn fetch(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Deletes `key`; deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Creates the backing table if the backend has one to create.
    async fn ensure_schema(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
