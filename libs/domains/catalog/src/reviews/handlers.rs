use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, patch},
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
use crate::products::ProductRepository;
use crate::reviews::models::{
    CreateReview, HelpfulVote, Review, ReviewEnvelope, ReviewListQuery, ReviewsEnvelope,
    UpdateReview,
};
use crate::reviews::repository::ReviewRepository;
use crate::reviews::service::ReviewService;

pub const TAG: &str = "reviews";

type SharedService<R, P> = Arc<ReviewService<R, P>>;

/// OpenAPI documentation for Reviews API
#[derive(OpenApi)]
#[openapi(
    paths(list_reviews, create_review, get_review, update_review, vote_helpful, delete_review),
    components(
        schemas(
            Review,
            CreateReview,
            UpdateReview,
            HelpfulVote,
            ReviewEnvelope,
            ReviewsEnvelope,
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
        (name = TAG, description = "Product review endpoints")
    )
)]
pub struct ApiDoc;

/// Create the review router with all HTTP endpoints
pub fn router<R, P>(service: ReviewService<R, P>) -> Router
where
    R: ReviewRepository + 'static,
    P: ProductRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/{id}",
            get(get_review).patch(update_review).delete(delete_review),
        )
        .route("/{id}/helpful", patch(vote_helpful))
        .with_state(shared_service)
}

/// List reviews with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ReviewListQuery),
    responses(
        (status = 200, description = "One page of reviews", body = ReviewsEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    Query(query): Query<ReviewListQuery>,
) -> CatalogResult<Json<ReviewsEnvelope>> {
    let (reviews, metadata) = service.list_reviews(query).await?;
    Ok(Json(ReviewsEnvelope { reviews, metadata }))
}

/// Create a review for an existing product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = ReviewEnvelope,
            headers(("Location" = String, description = "URL of the new review"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_review<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> CatalogResult<impl IntoResponse> {
    let review = service.create_review(input).await?;
    let location = format!("{API_PREFIX}/reviews/{}", review.rid);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ReviewEnvelope { review }),
    ))
}

/// Get a review by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review found", body = ReviewEnvelope),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_review<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<ReviewEnvelope>> {
    let review = service.get_review(id).await?;
    Ok(Json(ReviewEnvelope { review }))
}

/// Change a review's rating
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = ReviewEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_review<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateReview>,
) -> CatalogResult<Json<ReviewEnvelope>> {
    let review = service.update_review(id, input).await?;
    Ok(Json(ReviewEnvelope { review }))
}

/// Vote a review helpful (+1) or unhelpful (-1)
#[utoipa::path(
    patch,
    path = "/{id}/helpful",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    request_body = HelpfulVote,
    responses(
        (status = 200, description = "Helpful count adjusted", body = ReviewEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn vote_helpful<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    IdPath(id): IdPath,
    ValidatedJson(vote): ValidatedJson<HelpfulVote>,
) -> CatalogResult<Json<ReviewEnvelope>> {
    let review = service.vote_helpful(id, vote).await?;
    Ok(Json(ReviewEnvelope { review }))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted", body = MessageEnvelope),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: ReviewRepository, P: ProductRepository>(
    State(service): State<SharedService<R, P>>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<MessageEnvelope>> {
    service.delete_review(id).await?;
    Ok(Json(MessageEnvelope::new("review successfully deleted")))
}
