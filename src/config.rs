//! Configuration Module
//!
//! Loads server configuration from environment variables with defaults.

use std::env;
use std::net::{IpAddr, Ipv4Addr};

use crate::db::PgParams;

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,
    /// Database port
    pub db_port: u16,
    /// Database name
    pub db_name: String,
    /// Database user
    pub db_user: String,
    /// Database password
    pub db_password: String,
    /// Maximum number of entries the cache can hold
    pub cache_capacity: usize,
    /// Number of backend sessions to establish at boot
    pub pool_size: usize,
    /// Address the HTTP listener binds to
    pub listen_addr: IpAddr,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DB_HOST` - Database host (default: localhost)
    /// - `DB_PORT` - Database port (default: 5432)
    /// - `DB_NAME` - Database name (default: kvstore)
    /// - `DB_USER` - Database user (default: postgres)
    /// - `DB_PASSWORD` - Database password (default: empty)
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100)
    /// - `POOL_SIZE` - Backend sessions to establish (default: 8)
    /// - `LISTEN_ADDR` - Listen address (default: 0.0.0.0)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    pub fn from_env() -> Self {
        Self {
            db_host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            db_port: env::var("DB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5432),
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "kvstore".to_string()),
            db_user: env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            db_password: env::var("DB_PASSWORD").unwrap_or_default(),
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            pool_size: env::var("POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            listen_addr: env::var("LISTEN_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Backend connection parameters for the session pool.
    pub fn pg_params(&self) -> PgParams {
        PgParams {
            host: self.db_host.clone(),
            port: self.db_port,
            dbname: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "kvstore".to_string(),
            db_user: "postgres".to_string(),
            db_password: String::new(),
            cache_capacity: 100,
            pool_size: 8,
            listen_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            server_port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_pg_params_mirror_config() {
        let config = Config {
            db_host: "db.internal".to_string(),
            db_name: "kv".to_string(),
            ..Config::default()
        };
        let params = config.pg_params();
        assert_eq!(params.host, "db.internal");
        assert_eq!(params.dbname, "kv");
        assert_eq!(params.port, 5432);
    }
}
