//! Cache Module
//!
//! Bounded in-memory caching with LRU eviction and consistent snapshots.

mod lru;
mod stats;


// Re-export public types
pub use lru::{CacheState, LruCache};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
