//! Configuration for Reviews API

use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::common::RetryConfig;
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    /// Backoff for the startup connection (`DB_CONNECT_RETRIES`, `DB_CONNECT_RETRY_DELAY_MS`)
    pub retry: RetryConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let retry = RetryConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let run_migrations = env_parse("RUN_MIGRATIONS", "true")?;

        Ok(Self {
            app: app_info!(),
            database,
            retry,
            server,
            environment,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/reviews")),
                ("APP_ENV", None),
                ("PORT", None),
                ("RUN_MIGRATIONS", None),
                ("DB_CONNECT_RETRIES", None),
                ("DB_CONNECT_RETRY_DELAY_MS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.retry, RetryConfig::default());
                assert_eq!(config.app.name, "reviews_api");
                assert_eq!(config.database.url(), "postgresql://localhost/reviews");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.environment, Environment::Development);
                assert!(config.run_migrations);
            },
        );
    }

    #[test]
    fn test_config_can_skip_migrations() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/reviews")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(!config.run_migrations);
            },
        );
    }

    #[test]
    fn test_config_reads_connect_retries() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/reviews")),
                ("DB_CONNECT_RETRIES", Some("10")),
                ("DB_CONNECT_RETRY_DELAY_MS", Some("500")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.retry.max_retries, 10);
                assert_eq!(config.retry.initial_delay_ms, 500);
            },
        );
    }

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_config_rejects_bad_migration_flag() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/reviews")),
                ("RUN_MIGRATIONS", Some("sometimes")),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("RUN_MIGRATIONS"));
            },
        );
    }
}
