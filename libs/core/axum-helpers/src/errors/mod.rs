pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Every error response has this shape:
/// - `code`: integer error code for logging/monitoring (e.g., 1001)
/// - `error`: machine-readable identifier (e.g., "VALIDATION_ERROR")
/// - `message`: human-readable message
/// - `details`: optional structured details (field errors for validation failures)
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "Request validation failed",
///   "details": {
///     "rating": [{ "code": "range", "message": "must be between 1 and 5", "params": {} }]
///   }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Application error type that can be converted to HTTP responses.
///
/// Client errors are logged at `info`/`warn`; server errors are logged at
/// `error` with their full cause and answered with an opaque message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// The message is logged only; clients get the generic text.
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    /// A bounded operation ran out of time. Logged only, like `InternalServerError`.
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::JsonExtractorRejection(e) => {
                let status = match e.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    ErrorCode::PayloadTooLarge
                } else {
                    ErrorCode::JsonExtraction
                };
                tracing::warn!(error_code = code.code(), error = %e, "JSON extraction error");
                (status, code, e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    fields = ?e.field_errors().keys().collect::<Vec<_>>(),
                    "Validation error"
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    Some(validation_details(&e)),
                )
            }
            AppError::Database(e) => map_db_error(&e),
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                opaque(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
            }
            AppError::Timeout(msg) => {
                tracing::error!(
                    error_code = ErrorCode::DatabaseTimeout.code(),
                    "Operation timed out: {}",
                    msg
                );
                opaque(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseTimeout)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(
                    error_code = ErrorCode::ServiceUnavailable.code(),
                    "Service unavailable: {}",
                    msg
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::ServiceUnavailable,
                    msg,
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

type ErrorParts = (StatusCode, ErrorCode, String, Option<Value>);

fn opaque(status: StatusCode, code: ErrorCode) -> ErrorParts {
    (status, code, code.default_message().to_string(), None)
}

/// Map a SeaORM error to response parts. The cause is logged, never returned.
fn map_db_error(error: &DbErr) -> ErrorParts {
    match error {
        DbErr::ConnectionAcquire(e) => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database connection acquire failed: {:?}",
                e
            );
            opaque(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
        }
        _ => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database error: {:?}",
                error
            );
            opaque(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
        }
    }
}

/// Field errors as `{ field: [{ code, message, params }] }`.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    Value::Object(details)
}

/// Build an error response directly from an [`ErrorCode`].
///
/// # Example
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::NOT_FOUND,
///     "Resource not found".to_string(),
///     ErrorCode::NotFound,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;
    use validator::ValidationError;

    async fn into_parts(err: AppError) -> (StatusCode, Value) {
        use http_body_util::BodyExt;

        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_carries_field_details() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("range");
        error.message = Some("must be between 1 and 5".into());
        errors.add("rating", error);

        let (status, body) = into_parts(AppError::ValidationError(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1001);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["rating"][0]["message"], "must be between 1 and 5");
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let (status, body) = into_parts(AppError::NotFound("product 7".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "product 7");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let (status, body) =
            into_parts(AppError::InternalServerError("pool exploded".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn test_database_error_hides_cause() {
        let err = AppError::Database(DbErr::Custom("relation \"product\" does not exist".into()));
        let (status, body) = into_parts(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("relation"));
    }

    #[tokio::test]
    async fn test_connection_acquire_failure_is_opaque_500() {
        let err = AppError::Database(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        let (status, body) = into_parts(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(
            body["message"],
            "The server encountered a problem and could not process your request"
        );
    }

    #[tokio::test]
    async fn test_timeout_is_server_error() {
        let (status, body) = into_parts(AppError::Timeout("3s".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_TIMEOUT");
    }
}
