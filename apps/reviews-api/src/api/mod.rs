//! API routes module

pub mod health;

use axum::Router;
use axum_helpers::server::health_router;
use domain_catalog::{
    PgProductRepository, PgReviewRepository, ProductService, ReviewService, products, reviews,
};

use crate::state::AppState;

/// Create all API routes, relative to the `/v1` prefix
pub fn routes(state: &AppState) -> Router {
    let timeout = state.config.database.query_timeout();
    let product_repository = PgProductRepository::new(state.db.clone()).with_timeout(timeout);
    let review_repository = PgReviewRepository::new(state.db.clone()).with_timeout(timeout);

    let product_service = ProductService::new(product_repository.clone());
    let review_service = ReviewService::new(review_repository, product_repository);

    Router::new()
        .nest("/products", products::handlers::router(product_service))
        .nest("/reviews", reviews::handlers::router(review_service))
        .merge(health_router(state.config.app))
        .merge(health::router(state.clone()))
}
