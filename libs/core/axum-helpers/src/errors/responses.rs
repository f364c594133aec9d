//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "message": "The server encountered a problem and could not process your request"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Request validation failed",
        "details": {
            "rating": [{
                "code": "range",
                "message": "must be between 1 and 5",
                "params": {}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Malformed JSON body",
    content_type = "application/json",
    example = json!({
        "code": 1003,
        "error": "JSON_EXTRACTION",
        "message": "Failed to deserialize the JSON body into the target type: unknown field `avg_rating`"
    })
)]
pub struct BadRequestJsonResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "The requested resource could not be found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);
