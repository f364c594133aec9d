use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{
        BadRequestJsonResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    server::API_PREFIX,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::envelope::MessageEnvelope;
use crate::error::CatalogResult;
use crate::products::models::{
    CreateProduct, Product, ProductEnvelope, ProductListQuery, ProductsEnvelope, UpdateProduct,
};
use crate::products::repository::ProductRepository;
use crate::products::service::ProductService;

pub const TAG: &str = "products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, create_product, get_product, update_product, delete_product),
    components(
        schemas(
            Product,
            CreateProduct,
            UpdateProduct,
            ProductEnvelope,
            ProductsEnvelope,
            MessageEnvelope
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestJsonResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductsEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<ProductListQuery>,
) -> CatalogResult<Json<ProductsEnvelope>> {
    let (products, metadata) = service.list_products(query).await?;
    Ok(Json(ProductsEnvelope { products, metadata }))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductEnvelope,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    let location = format!("{API_PREFIX}/products/{}", product.pid);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductEnvelope { product }),
    ))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductEnvelope),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<ProductEnvelope>> {
    let product = service.get_product(id).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<ProductEnvelope>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// Delete a product and its reviews
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageEnvelope),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<MessageEnvelope>> {
    service.delete_product(id).await?;
    Ok(Json(MessageEnvelope::new("product successfully deleted")))
}
