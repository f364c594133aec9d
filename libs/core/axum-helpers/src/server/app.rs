use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
};
use core_config::Environment;
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;

/// Prefix every API route is nested under.
pub const API_PREFIX: &str = "/v1";

/// Upper bound for request bodies, in bytes.
pub const MAX_BODY_BYTES: usize = 256_000;

/// Creates the application router with documentation and common middleware.
///
/// Sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar)
/// - API routes nested under `/v1`
/// - Request body limit of [`MAX_BODY_BYTES`]
/// - Tracing, CORS and response compression layers
/// - JSON 404 / 405 fallbacks
///
/// # CORS Configuration
///
/// `CORS_ALLOWED_ORIGIN` holds comma-separated allowed origins. When unset,
/// development falls back to a permissive policy and production refuses to
/// start.
///
/// - Development: `CORS_ALLOWED_ORIGIN=http://localhost:3000,http://localhost:5173`
/// - Production: `CORS_ALLOWED_ORIGIN=https://example.com`
///
/// # Errors
/// Returns `InvalidInput` if the origin list is malformed or empty, or if it
/// is unset in production.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use utoipa::OpenApi;
/// use axum_helpers::server::create_router;
///
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let api_routes = Router::new().nest("/products", products_router);
/// let router = create_router::<ApiDoc>(api_routes).await?;
/// ```
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer = cors_layer_from_env(&Environment::from_env())?;
    Ok(create_router_with_cors::<T>(apis, cors_layer))
}

/// [`create_router`] with an explicit CORS policy instead of the environment.
pub fn create_router_with_cors<T>(apis: Router, cors_layer: CorsLayer) -> Router
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest(API_PREFIX, apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer)
        .layer(CompressionLayer::new())
}

fn cors_layer_from_env(environment: &Environment) -> io::Result<CorsLayer> {
    let Ok(origins_str) = std::env::var("CORS_ALLOWED_ORIGIN") else {
        if environment.is_production() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CORS_ALLOWED_ORIGIN is required in production. Example: CORS_ALLOWED_ORIGIN=https://example.com",
            ));
        }
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(CorsLayer::permissive());
    };

    let allowed_origins: Vec<HeaderValue> = origins_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<HeaderValue>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    if allowed_origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    info!(origins = %origins_str, "CORS configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600)))
}

/// Serve `router` until SIGTERM/SIGINT, then run `cleanup` within the
/// configured shutdown timeout.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::create_production_app;
///
/// let cleanup = async move {
///     db.close().await.ok();
/// };
///
/// create_production_app(router, &config.server, cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let shutdown_timeout = server_config.shutdown_timeout;
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();
    let signal_handle = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!(address = %listener.local_addr()?, "Server starting");

    tokio::spawn(async move {
        signal_handle.wait_for_signal().await;
    });

    let mut cleanup_rx = coordinator.subscribe();
    let cleanup_handle = tokio::spawn(async move {
        let _ = cleanup_rx.recv().await;

        info!(timeout = ?shutdown_timeout, "Starting cleanup tasks");
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => warn!(timeout = ?shutdown_timeout, "Cleanup exceeded timeout, forcing shutdown"),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "Server encountered an error");
        });

    // The server may stop on its own error; make sure cleanup still runs.
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;
    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct EmptyDoc;

    async fn test_router() -> Router {
        let apis = Router::new().route("/echo", post(|body: String| async move { body }));
        create_router_with_cors::<EmptyDoc>(apis, CorsLayer::permissive())
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_prefix() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/echo")
            .body(Body::from("hi"))
            .unwrap();
        let response = test_router().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = test_router().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_method_not_allowed() {
        let request = Request::builder().uri("/v1/echo").body(Body::empty()).unwrap();
        let response = test_router().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/echo")
            .body(Body::from("x".repeat(MAX_BODY_BYTES + 1)))
            .unwrap();
        let response = test_router().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_cors_required_in_production() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(cors_layer_from_env(&Environment::Production).is_err());
            assert!(cors_layer_from_env(&Environment::Development).is_ok());
        });
    }

    #[test]
    fn test_cors_rejects_empty_list() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(" , "), || {
            assert!(cors_layer_from_env(&Environment::Development).is_err());
        });
    }
}
