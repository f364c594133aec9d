use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use std::time::Duration;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Message returned for every missing record, whatever the reason.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    Product,
    Review,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{field} references {kind} {id}, which does not exist")]
    DanglingReference {
        field: &'static str,
        kind: RecordKind,
        id: i64,
    },

    #[error("{0} {1} not found")]
    NotFound(RecordKind, i64),

    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),

    #[error("Storage operation exceeded {0:?}")]
    Timeout(Duration),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => AppError::ValidationError(errors),
            CatalogError::DanglingReference { field, kind, .. } => {
                let mut error = ValidationError::new("exists");
                error.message = Some(format!("referenced {kind} does not exist").into());
                let mut errors = ValidationErrors::new();
                errors.add(field, error);
                AppError::ValidationError(errors)
            }
            CatalogError::NotFound(kind, id) => {
                tracing::debug!(%kind, id, "Record not found");
                AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
            }
            CatalogError::Storage(e) => AppError::Database(e),
            CatalogError::Timeout(limit) => {
                AppError::Timeout(format!("storage operation exceeded {limit:?}"))
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
