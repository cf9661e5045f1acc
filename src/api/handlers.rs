//! API Handlers
//!
//! HTTP request handlers for each endpoint. Handlers validate parameter
//! presence, delegate to the store, and render the plain-text bodies the
//! endpoints promise.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    Json,
};

use crate::cache::CacheState;
use crate::db::BackendSession;
use crate::error::{KvError, Result};
use crate::models::{CreateForm, HealthResponse, KeyQuery, StatsResponse};
use crate::store::{KvStore, ReadSource};

// == Application State ==
/// Shared state handed to every handler: the store, which owns the cache
/// and the session pool. Constructed once at startup.
pub struct AppState<S: BackendSession> {
    pub store: Arc<KvStore<S>>,
}

impl<S: BackendSession> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BackendSession> AppState<S> {
    pub fn new(store: KvStore<S>) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

// == Create ==
/// Handler for `POST /create`.
///
/// Upserts a key-value pair, write-through.
pub async fn create_handler<S: BackendSession>(
    State(state): State<AppState<S>>,
    Form(form): Form<CreateForm>,
) -> Result<String> {
    let Some((key, value)) = form.fields() else {
        return Err(KvError::InvalidRequest(
            "Missing 'key' or 'value' parameters".to_string(),
        ));
    };

    state.store.create(key.clone(), value).await?;
    Ok(format!("Successfully created/updated key: {key}"))
}

// == Read ==
/// Handler for `GET /read?key=K`.
///
/// Read-through lookup; the body says whether the cache or the database
/// answered.
pub async fn read_handler<S: BackendSession>(
    State(state): State<AppState<S>>,
    Query(query): Query<KeyQuery>,
) -> Result<String> {
    let Some(key) = query.key else {
        return Err(KvError::InvalidRequest(
            "Missing 'key' parameter".to_string(),
        ));
    };

    match state.store.read(&key).await? {
        ReadSource::Cache(value) => Ok(format!("Value (from cache): {value}")),
        ReadSource::Backend(value) => Ok(format!("Value (from DB): {value}")),
    }
}

// == Delete ==
/// Handler for `DELETE /delete?key=K`.
pub async fn delete_handler<S: BackendSession>(
    State(state): State<AppState<S>>,
    Query(query): Query<KeyQuery>,
) -> Result<String> {
    let Some(key) = query.key else {
        return Err(KvError::InvalidRequest(
            "Missing 'key' parameter".to_string(),
        ));
    };

    state.store.delete(&key).await?;
    Ok(format!("Successfully deleted key: {key}"))
}

// == Cache Status ==
/// Handler for `GET /cache-status`.
///
/// Dumps the cache snapshot as a plain-text page.
pub async fn cache_status_handler<S: BackendSession>(State(state): State<AppState<S>>) -> String {
    render_cache_status(&state.store.cache_state())
}

/// Renders a snapshot in the fixed status-page format.
pub fn render_cache_status(state: &CacheState) -> String {
    let mut page = String::new();
    page.push_str("--- Cache Status ---\n");
    let _ = writeln!(page, "Occupied: {} / {}", state.current_size, state.max_size);
    page.push_str("\n--- Items (MRU to LRU) ---\n");

    if state.items.is_empty() {
        page.push_str("(Cache is empty)\n");
    } else {
        for (position, (key, value)) in state.items.iter().enumerate() {
            let _ = writeln!(page, "{}. Key: '{}', Value: '{}'", position + 1, key, value);
        }
    }

    page
}

// == Stats ==
/// Handler for `GET /stats`.
pub async fn stats_handler<S: BackendSession>(
    State(state): State<AppState<S>>,
) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.cache_stats()))
}

// == Health ==
/// Handler for `GET /health`.
pub async fn health_handler<S: BackendSession>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.store.pool().capacity()))
}
