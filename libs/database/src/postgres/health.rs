use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::debug;

use crate::common::DatabaseError;

/// Run `SELECT 1` against the pool, bounded by `timeout`.
pub async fn check_health(db: &DatabaseConnection, timeout: Duration) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    tokio::time::timeout(timeout, db.query_one_raw(stmt))
        .await
        .map_err(|_| DatabaseError::HealthCheckFailed(format!("no response within {timeout:?}")))?
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}
