//! Unified error types for Trip Tide backend crates
//!
//! Every repository, service and resolver returns [`ServiceError`], which
//! carries a stable machine-readable code. Transport adapters (GraphQL, HTTP)
//! translate it for clients; server-side categories never leak their details.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "graphql")]
pub mod graphql;
pub mod validation;

pub use validation::{FieldError, ValidationError};

/// Stable error codes surfaced to clients
pub mod error_codes {
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";
    pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Message returned to clients in place of server-side failure details
pub const MASKED_MESSAGE: &str = "Internal server error";

/// Core service error type used across the backend
///
/// # Example
/// ```
/// use error_types::{error_codes, ServiceError};
///
/// let err = ServiceError::not_found("Post", "64b7f0c2a1e4b3d2c1f0e9a8");
/// assert_eq!(err.code(), error_codes::NOT_FOUND);
/// assert_eq!(err.to_string(), "Post not found");
/// ```
#[derive(Debug, Error, Clone)]
pub enum ServiceError {
    /// No viewer, or credentials did not check out
    #[error("{message}")]
    Unauthenticated { message: String },

    /// Viewer is known but does not own the resource
    #[error("{message}")]
    PermissionDenied { message: String },

    /// Resource not found
    #[error("{resource} not found")]
    NotFound { resource: &'static str, id: String },

    /// Unique index rejected the write
    #[error("{field} is already taken")]
    DuplicateKey { field: String },

    /// Field-level validation failed
    #[error(transparent)]
    Validation {
        #[from]
        source: ValidationError,
    },

    /// Database operation failed
    #[error("Database error: {message}")]
    Database { message: String },

    /// Internal server error (catch-all)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            source: ValidationError::new(message),
        }
    }

    pub fn database(error: impl fmt::Display) -> Self {
        Self::Database {
            message: error.to_string(),
        }
    }

    /// Create internal error from any displayable error
    pub fn internal(error: impl fmt::Display) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }

    /// Client-facing error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => error_codes::UNAUTHENTICATED,
            Self::PermissionDenied { .. } => error_codes::FORBIDDEN,
            Self::NotFound { .. } => error_codes::NOT_FOUND,
            Self::DuplicateKey { .. } => error_codes::DUPLICATE_KEY,
            Self::Validation { .. } => error_codes::BAD_USER_INPUT,
            Self::Database { .. } | Self::Internal { .. } => error_codes::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP status matching the error category
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::PermissionDenied { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::DuplicateKey { .. } => 409,
            Self::Validation { .. } => 400,
            Self::Database { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Whether the caller caused the failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database { .. } | Self::Internal { .. })
    }

    /// Message safe to show to clients
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            MASKED_MESSAGE.to_string()
        }
    }

    /// Log error with appropriate level and context
    pub fn log(&self) {
        match self {
            Self::NotFound { .. } | Self::Validation { .. } | Self::DuplicateKey { .. } => {
                tracing::debug!(error = ?self, "Client error");
            }
            Self::Unauthenticated { .. } | Self::PermissionDenied { .. } => {
                tracing::warn!(error = %self, "Authorization failure");
            }
            Self::Database { .. } | Self::Internal { .. } => {
                tracing::error!(error = ?self, "Server error");
            }
        }
    }
}

/// JSON body for non-GraphQL HTTP failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            status,
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(error: &ServiceError) -> Self {
        Self::new(error.code(), error.client_message(), error.status_code())
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
