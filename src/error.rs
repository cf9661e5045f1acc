//! Error types for the key-value server
//!
//! Provides unified error handling using thiserror. Errors render as
//! plain-text HTTP responses; the message is the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::BackendError;

// == KV Error Enum ==
/// Unified error type for the key-value server.
#[derive(Error, Debug)]
pub enum KvError {
    /// Key absent in both cache and backend
    #[error("Key not found")]
    NotFound,

    /// Missing or over-limit request data
    #[error("{0}")]
    InvalidRequest(String),

    /// A write or delete failed at the backend
    #[error("Database operation failed")]
    Backend(#[source] BackendError),
}

// == IntoResponse Implementation ==
impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let status = match &self {
            KvError::NotFound => StatusCode::NOT_FOUND,
            KvError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            KvError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the key-value server.
pub type Result<T> = std::result::Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_response_bodies() {
        assert_eq!(KvError::NotFound.to_string(), "Key not found");
        assert_eq!(
            KvError::InvalidRequest("Missing 'key' parameter".to_string()).to_string(),
            "Missing 'key' parameter"
        );
        assert_eq!(
            KvError::Backend(BackendError::Query("boom".to_string())).to_string(),
            "Database operation failed"
        );
    }
}
