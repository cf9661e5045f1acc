//! kvstore - a read-through/write-through key-value store over HTTP
//!
//! Persists key-value pairs in PostgreSQL and accelerates reads through a
//! bounded in-memory LRU cache with least-recently-used eviction.

mod api;
mod cache;
mod config;
mod db;
mod error;
mod models;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use cache::LruCache;
use config::Config;
use db::{BackendSession, PgSession, SessionPool};
use store::KvStore;

/// Main entry point for the key-value server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Establish the backend session pool; exit if no session came up
/// 4. Create the LRU cache and the store
/// 5. Create the Axum router and start the HTTP server
/// 6. Handle graceful shutdown on SIGINT/SIGTERM, closing the pool
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvstore=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kvstore server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: db={}@{}:{}/{}, cache_capacity={}, pool_size={}, port={}",
        config.db_user,
        config.db_host,
        config.db_port,
        config.db_name,
        config.cache_capacity,
        config.pool_size,
        config.server_port
    );

    // Establish the backend session pool; the server is useless without it
    let pool = SessionPool::<PgSession>::connect(config.pg_params(), config.pool_size).await;
    if !pool.is_connected() {
        error!("Failed to start server: could not establish any database session");
        std::process::exit(1);
    }

    // Create the backing table if it is not managed externally
    {
        let session = pool.acquire().await;
        if let Err(e) = session.ensure_schema().await {
            warn!(error = %e, "schema bootstrap failed, assuming kv_pairs exists");
        }
    }

    // Create application state: one cache, one pool, for the process lifetime
    let cache = LruCache::new(config.cache_capacity);
    let store = Arc::new(KvStore::new(cache, pool));
    let state = AppState {
        store: Arc::clone(&store),
    };
    info!("Store initialized");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to the configured address
    let addr = SocketAddr::new(config.listen_addr, config.server_port);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // The listener is closed; release the backend sessions
    store.shutdown();
    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
