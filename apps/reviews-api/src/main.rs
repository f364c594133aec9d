//! Reviews API - REST server for products and their reviews

use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = connect_from_config_with_retry(
        config.database.clone(),
        Some(config.retry.clone()),
    )
    .await?;

    if config.run_migrations {
        run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
    };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state)).await?;

    info!(
        app = config.app.name,
        version = config.app.version,
        port = config.server.port,
        "Starting Reviews API"
    );

    create_production_app(router, &config.server, async move {
        info!("Shutting down: closing PostgreSQL pool");
        if let Err(e) = db.close().await {
            tracing::error!(error = %e, "Failed to close PostgreSQL pool");
        }
    })
    .await?;

    info!("Reviews API shutdown complete");
    Ok(())
}
