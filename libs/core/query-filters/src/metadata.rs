use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pagination summary returned next to every list page.
///
/// Zero, `false` and absent fields are left out of the JSON, so a result
/// with no records serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_next_page: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_prev_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<i64>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Derive pagination metadata from a total row count.
///
/// Returns the empty value when there are no records (or the page size is
/// not positive), which keeps "no results" distinct from "page 1 of N".
pub fn compute_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    let last_page = (total_records + page_size - 1) / page_size;
    let has_next_page = page < last_page;
    let has_prev_page = page > 1;

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page,
        total_records,
        has_next_page,
        has_prev_page,
        next_page: has_next_page.then_some(page + 1),
        prev_page: has_prev_page.then_some(page - 1),
    }
}
