/**
 * Backend Error Types
 *
 * Error types specific to the backend server. Handlers return
 * `Result<_, BackendError>` and the error converts itself into a JSON
 * response (see `conversion`).
 *
 * # Error Types
 *
 * - `HandlerError` - Request-level failures with an explicit status
 * - `AuthError` - Missing, malformed or rejected credentials
 * - `StorageError` - Database faults (safe to retry)
 * - `StateError` - Startup and application state failures
 *
 * # Status Mapping
 *
 * Validation errors map to 400, missing entities to 404, credential
 * problems to 401 and storage faults to 500.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use polygone::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::CONFLICT, "Username already taken");
/// assert_eq!(err.status_code(), StatusCode::CONFLICT);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Authentication failure
    #[error("Authentication error: {message}")]
    AuthError {
        /// Human-readable error message
        message: String,
    },

    /// Database failure
    #[error("Storage error: {0}")]
    StorageError(#[from] sqlx::Error),

    /// Startup or state management error (migrations, binding, ...)
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (validation, not found, serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `AuthError` - 401 Unauthorized
    /// - `StorageError` / `StateError` - 500 Internal Server Error
    /// - `SharedError` - 400 for validation, 404 for not found, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::NotFound { .. } => StatusCode::NOT_FOUND,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    ///
    /// Storage faults are reported generically; the detail goes to the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::AuthError { message } => message.clone(),
            Self::StorageError(_) => "Database error".to_string(),
            Self::StateError { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
