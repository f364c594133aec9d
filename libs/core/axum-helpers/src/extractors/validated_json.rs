//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Deserialization failures (malformed JSON, wrong types, unknown fields on
/// `deny_unknown_fields` types, oversized bodies) and `Validate` failures are
/// both rejected as [`AppError`].
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// #[serde(deny_unknown_fields)]
/// struct CreateTag {
///     #[validate(length(min = 1, max = 50))]
///     name: String,
/// }
///
/// async fn create_tag(ValidatedJson(payload): ValidatedJson<CreateTag>) -> String {
///     format!("Creating tag: {}", payload.name)
/// }
///
/// let app = Router::new().route("/tags", post(create_tag));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Tag {
        #[validate(length(min = 1, max = 5))]
        name: String,
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route(
            "/tags",
            post(|ValidatedJson(tag): ValidatedJson<Tag>| async move { tag.name }),
        );
        let request = Request::builder()
            .method("POST")
            .uri("/tags")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let (status, _) = post_json(r#"{"name":"rust"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_body_reports_field() {
        let (status, body) = post_json(r#"{"name":"too long"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let (status, body) = post_json(r#"{"name":"rust","extra":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "JSON_EXTRACTION");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, _) = post_json(r#"{"name":"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
