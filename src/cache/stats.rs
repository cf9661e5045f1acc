//! Cache Statistics Module
//!
//! Counters describing how the cache has behaved since startup.

use serde::Serialize;

// == Cache Stats ==
/// Hit, miss and eviction counters plus the current entry count.
///
/// The counters are maintained under the cache mutex; a returned value is
/// a snapshot and does not track later activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups the cache could not answer
    pub misses: u64,
    /// Entries displaced by the LRU policy
    pub evictions: u64,
    /// Entries resident when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of lookups answered from the cache, 0.0 when idle.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
