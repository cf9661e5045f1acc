//! Response DTOs for the key-value server API
//!
//! The data endpoints answer in plain text; only the observability
//! endpoints (`/health`, `/stats`) serialize JSON bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status, "healthy" while the server is up
    pub status: String,
    /// Backend sessions currently available to the pool
    pub database_sessions: usize,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(database_sessions: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            database_sessions,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Body for `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(4);
        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(json.contains("healthy"));
        assert!(json.contains("\"database_sessions\":4"));
    }

    #[test]
    fn test_stats_response_from_counters() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.total_entries = 7;

        let resp = StatsResponse::from(stats);
        assert_eq!(resp.hits, 1);
        assert_eq!(resp.misses, 1);
        assert_eq!(resp.total_entries, 7);
        assert_eq!(resp.hit_rate, 0.5);
    }
}
