//! Request and Response models for the key-value server API
//!
//! DTOs for the HTTP surface: optional-field request shapes that let the
//! handlers report missing parameters precisely, and the JSON bodies of
//! the observability endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreateForm, KeyQuery};
pub use responses::{HealthResponse, StatsResponse};
