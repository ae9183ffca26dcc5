//! Error types for pawsinus-core

use thiserror::Error;

/// Errors surfaced by repositories and the core wiring
#[derive(Debug, Error)]
pub enum CoreError {
    /// Transport-level failure (connection refused, timeout, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Input rejected by the backend or by local validation
    #[error("Validation failed for '{field}': {reason}")]
    Validation {
        field: String,
        reason: String,
    },

    /// Backend returned an unexpected response
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local query construction or execution failure
    #[error("Query error: {0}")]
    Query(String),
}

impl CoreError {
    /// Map an HTTP status to the declared failure modes.
    ///
    /// Used by the live repositories; stubs never produce these.
    pub fn from_status(status: u16, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            401 | 403 => CoreError::Unauthorized(context),
            404 | 406 => CoreError::NotFound(context),
            400 | 409 | 422 => CoreError::Validation {
                field: "request".to_string(),
                reason: context,
            },
            _ => CoreError::Backend(format!("status {}: {}", status, context)),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            CoreError::from_status(status.as_u16(), e.to_string())
        } else {
            CoreError::Network(e.to_string())
        }
    }
}

/// Result type alias for the core
pub type Result<T> = std::result::Result<T, CoreError>;
