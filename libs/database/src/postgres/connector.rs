use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Connect using a [`PostgresConfig`].
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    connect_with_options(config.into_connect_options()).await
}

/// Connect with explicit SeaORM connection options.
pub async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!("Successfully connected to PostgreSQL database");
    Ok(db)
}

/// Connect from config, retrying with exponential backoff.
///
/// Useful at startup when PostgreSQL may still be coming up next to the app.
///
/// # Example
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config_with_retry};
/// use database::common::RetryConfig;
///
/// let config = PostgresConfig::from_env()?;
/// let db = connect_from_config_with_retry(config, Some(RetryConfig::new().with_max_retries(5))).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    let options = config.into_connect_options();

    retry_with_backoff(
        || connect_with_options(options.clone()),
        retry_config.unwrap_or_default(),
    )
    .await
    .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Apply all pending migrations of `M`.
///
/// # Example
/// ```ignore
/// use migration::Migrator;
/// use database::postgres::run_migrations;
///
/// run_migrations::<Migrator>(&db, "reviews_api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(app = app_name, "Migrations completed successfully");
    Ok(())
}
