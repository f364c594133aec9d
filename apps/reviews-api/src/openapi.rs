//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for Reviews API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reviews API",
        version = "0.1.0",
        description = "Products and their reviews, with average ratings kept in step",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(crate::api::health::ready_handler),
    nest(
        (path = "/v1", api = axum_helpers::server::HealthApiDoc),
        (path = "/v1/products", api = domain_catalog::products::handlers::ApiDoc),
        (path = "/v1/reviews", api = domain_catalog::reviews::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/v1/healthcheck",
            "/v1/ready",
            "/v1/products",
            "/v1/products/{id}",
            "/v1/reviews",
            "/v1/reviews/{id}",
            "/v1/reviews/{id}/helpful",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
