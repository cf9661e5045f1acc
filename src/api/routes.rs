//! API Routes
//!
//! Configures the Axum router with all server endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::BackendSession;

use super::handlers::{
    cache_status_handler, create_handler, delete_handler, health_handler, read_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /create` - Upsert a key-value pair (form fields `key`, `value`)
/// - `GET /read?key=K` - Read a value, cache first
/// - `DELETE /delete?key=K` - Delete a key
/// - `GET /cache-status` - Plain-text cache dump, MRU to LRU
/// - `GET /stats` - Cache counters as JSON
/// - `GET /health` - Liveness probe
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<S: BackendSession>(state: AppState<S>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/create", post(create_handler::<S>))
        .route("/read", get(read_handler::<S>))
        .route("/delete", delete(delete_handler::<S>))
        .route("/cache-status", get(cache_status_handler::<S>))
        .route("/stats", get(stats_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
