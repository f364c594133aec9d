use chrono::{DateTime, Utc};
use query_filters::{
    FieldChecks, Filters, Metadata, RawFilters, SortColumn, parse_optional, permitted_value,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::rating::{MAX_RATING, MIN_RATING};

/// Review entity, as read back joined with its product's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    /// Unique identifier
    pub rid: i64,
    /// Owning product
    pub prod_id: i64,
    pub product_name: String,
    /// 1 to 5
    pub rating: i16,
    /// Never negative
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields of a review a client may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReviewField {
    ProdId,
    Rating,
    HelpfulCount,
    Increment,
}

fn check_rating(checks: &mut FieldChecks, rating: i16) {
    if rating == 0 {
        checks.add(ReviewField::Rating, "required", "must be provided");
    } else {
        checks.check(
            (MIN_RATING..=MAX_RATING).contains(&rating),
            ReviewField::Rating,
            "range",
            format!("must be between {MIN_RATING} and {MAX_RATING}"),
        );
    }
}

/// DTO for creating a review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateReview {
    #[serde(default)]
    #[schema(example = 1)]
    pub prod_id: i64,
    #[serde(default)]
    #[schema(example = 4, minimum = 1, maximum = 5)]
    pub rating: i16,
}

impl Validate for CreateReview {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        if self.prod_id == 0 {
            checks.add(ReviewField::ProdId, "required", "must be provided");
        } else {
            checks.check(
                self.prod_id > 0,
                ReviewField::ProdId,
                "positive",
                "must be a positive integer",
            );
        }
        check_rating(&mut checks, self.rating);
        checks.finish()
    }
}

/// DTO for a partial review update. Only the rating is writable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateReview {
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: Option<i16>,
}

impl Validate for UpdateReview {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        if let Some(rating) = self.rating {
            check_rating(&mut checks, rating);
        }
        checks.finish()
    }
}

/// Body of `PATCH /reviews/{id}/helpful`: `+1` or `-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct HelpfulVote {
    #[serde(default)]
    #[schema(example = 1)]
    pub increment: i8,
}

impl Validate for HelpfulVote {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        checks.check(
            permitted_value(&self.increment, &[1, -1]),
            ReviewField::Increment,
            "permitted",
            "must be 1 or -1",
        );
        checks.finish()
    }
}

/// Sortable review columns. `?sort=-helpful_count` sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    Rid,
    Rating,
    HelpfulCount,
    CreatedAt,
}

impl SortColumn for ReviewSort {
    const TIEBREAKER: &'static str = "r.rid";

    fn column(self) -> &'static str {
        match self {
            Self::Rid => "r.rid",
            Self::Rating => "r.rating",
            Self::HelpfulCount => "r.helpful_count",
            Self::CreatedAt => "r.created_at",
        }
    }
}

/// Equality filters for review listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub prod_id: Option<i64>,
    pub rating: Option<i16>,
    pub helpful_count: Option<i32>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.prod_id.is_none_or(|id| review.prod_id == id)
            && self.rating.is_none_or(|r| review.rating == r)
            && self.helpful_count.is_none_or(|c| review.helpful_count == c)
    }
}

/// Raw query string of `GET /reviews`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Only reviews of this product
    pub prod_id: Option<String>,
    /// Only reviews with this rating
    pub rating: Option<String>,
    /// Only reviews with this helpful count
    pub helpful_count: Option<String>,
    /// Page number, 1..=500 (default 1)
    pub page: Option<String>,
    /// Page size, 1..=100 (default 10)
    pub page_size: Option<String>,
    /// One of rid, rating, helpful_count, created_at; `-` prefix for descending
    pub sort: Option<String>,
}

impl ReviewListQuery {
    /// Validate every parameter, reporting all problems at once.
    pub fn into_parts(self) -> Result<(ReviewFilter, Filters<ReviewSort>), ValidationErrors> {
        let mut checks = FieldChecks::new();

        let filter = ReviewFilter {
            prod_id: parse_optional(&mut checks, ReviewField::ProdId, self.prod_id.as_deref()),
            rating: parse_optional(&mut checks, ReviewField::Rating, self.rating.as_deref()),
            helpful_count: parse_optional(
                &mut checks,
                ReviewField::HelpfulCount,
                self.helpful_count.as_deref(),
            ),
        };

        let filters = RawFilters {
            page: self.page,
            page_size: self.page_size,
            sort: self.sort,
        }
        .validate_into::<ReviewSort>(&mut checks);

        checks.finish()?;
        Ok((filter, filters))
    }
}

/// `{"review": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewEnvelope {
    pub review: Review,
}

/// `{"reviews": [...], "@metadata": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewsEnvelope {
    pub reviews: Vec<Review>,
    #[serde(rename = "@metadata")]
    pub metadata: Metadata,
}
