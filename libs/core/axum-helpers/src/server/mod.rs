//! Server infrastructure module.
//!
//! Provides:
//! - Router setup with OpenAPI documentation and common layers
//! - Liveness and readiness helpers
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let api_routes = domain_routes.merge(health_router(app_info!()));
//! let router = create_router::<ApiDoc>(api_routes).await?;
//!
//! create_production_app(router, &config.server, async move { db.close().await.ok(); }).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{
    API_PREFIX, MAX_BODY_BYTES, create_production_app, create_router, create_router_with_cors,
};
pub use health::{
    HealthApiDoc, HealthCheckFuture, HealthResponse, health_router, run_health_checks,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
