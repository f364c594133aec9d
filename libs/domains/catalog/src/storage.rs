//! Shared plumbing for the PostgreSQL repositories.

use sea_orm::FromQueryResult;
use std::future::Future;
use std::time::Duration;

use crate::error::{CatalogError, CatalogResult};

/// Per-operation deadline used when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Run `operation` with an upper bound of `limit`.
///
/// On expiry the future is dropped, which rolls back any transaction it had
/// open, and [`CatalogError::Timeout`] is returned.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> CatalogResult<T>
where
    F: Future<Output = CatalogResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout = ?limit, "Storage operation timed out");
            Err(CatalogError::Timeout(limit))
        }
    }
}

/// Single-column `RETURNING pid` / `RETURNING rid` style rows.
#[derive(Debug, FromQueryResult)]
pub(crate) struct IdRow {
    pub id: i64,
}

#[derive(Debug, FromQueryResult)]
pub(crate) struct ExistsRow {
    pub found: bool,
}
