/**
 * Backend Error Types
 *
 * This module defines the error type shared by every store operation and
 * HTTP handler in the messaging backend.
 *
 * # Error Categories
 *
 * - Authorization failures (not a participant, not the author) are
 *   terminal: surfaced to the caller, never retried.
 * - Not-found is benign for deletes (handled before it becomes an error)
 *   and a hard failure everywhere else.
 * - Database and serialization errors are internal faults.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Errors produced by the messaging stores and handlers
#[derive(Debug, Error)]
pub enum ChatError {
    /// Caller is not allowed to perform the operation
    /// (not a participant of the conversation, or not the author of the
    /// message). Terminal: clients must not retry.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request data failed validation
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Shared error (from shared module)
    #[error(transparent)]
    Shared(#[from] SharedError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatError {
    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a not-found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    /// Create an invalid-argument error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::Shared(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
