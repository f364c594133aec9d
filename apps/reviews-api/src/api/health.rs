//! Readiness endpoint backed by a real database round trip.

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;

use crate::state::AppState;

/// Readiness check: 200 when PostgreSQL answers within the query timeout,
/// 503 otherwise.
#[utoipa::path(
    get,
    path = "/v1/ready",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies reachable"),
        (status = 503, description = "A dependency is unreachable")
    )
)]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let timeout = state.config.database.query_timeout();
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            check_health(&state.db, timeout)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}
