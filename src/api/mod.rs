//! API Module
//!
//! HTTP handlers and routing for the key-value server.
//!
//! # Endpoints
//! - `POST /create` - Upsert a key-value pair
//! - `GET /read?key=K` - Read a value, cache first
//! - `DELETE /delete?key=K` - Delete a key
//! - `GET /cache-status` - Plain-text cache dump
//! - `GET /stats` - Cache counters
//! - `GET /health` - Liveness probe

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
