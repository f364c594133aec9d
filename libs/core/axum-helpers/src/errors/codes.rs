//! Type-safe error codes for API responses.
//!
//! Each error code carries:
//! - a string identifier for clients (e.g., "VALIDATION_ERROR")
//! - an integer code for logs and monitoring (e.g., 1001)
//! - a default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Path id is not a positive integer
    InvalidId,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Request was malformed in some other way
    BadRequest,

    /// HTTP method not supported by the resource
    MethodNotAllowed,

    /// Request body exceeded the configured limit
    PayloadTooLarge,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    // Database errors (2000-2999)
    /// Database connection or query error
    DatabaseError,

    /// A database operation did not finish in time
    DatabaseTimeout,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling by clients.
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidId => "INVALID_ID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseTimeout => "DATABASE_TIMEOUT",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1999: client and generic server errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidId => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::BadRequest => 1006,
            Self::MethodNotAllowed => 1007,
            Self::PayloadTooLarge => 1008,

            Self::DatabaseError => 2003,
            Self::DatabaseTimeout => 2012,
        }
    }

    /// Default user-facing message. Server-side codes never leak internals.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidId => "The requested resource could not be found",
            Self::JsonExtraction => "The request body could not be parsed",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::MethodNotAllowed => "The HTTP method is not supported for this resource",
            Self::PayloadTooLarge => "The request body is too large",
            Self::InternalError | Self::DatabaseError | Self::DatabaseTimeout => {
                "The server encountered a problem and could not process your request"
            }
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
