//! Database Module
//!
//! Backend sessions, the PostgreSQL implementation, and the pool that
//! hands sessions out to request workers.

mod backend;
mod pool;
mod postgres;

// Re-export public types
pub use backend::{BackendError, BackendSession};
pub use pool::{PooledSession, SessionPool};
pub use postgres::{PgParams, PgSession};
