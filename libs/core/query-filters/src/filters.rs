use serde::Deserialize;
use strum::IntoStaticStr;
use validator::ValidationErrors;

use crate::checks::FieldChecks;
use crate::metadata::{Metadata, compute_metadata};
use crate::sort::{SortColumn, SortDirection, resolve_sort_column, resolve_sort_direction};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE: i64 = 500;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query-string fields owned by the filter engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FilterField {
    Page,
    PageSize,
    Sort,
}

/// Unparsed paging and sorting input, exactly as it arrived.
///
/// Kept as strings so that a non-numeric `page` becomes a field-level
/// validation message instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilters {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl RawFilters {
    /// Validate against the allow-list of `S`, reporting every violation.
    pub fn validate<S: SortColumn>(&self) -> Result<Filters<S>, ValidationErrors> {
        let mut checks = FieldChecks::new();
        let filters = self.validate_into(&mut checks);
        checks.finish()?;
        Ok(filters)
    }

    /// Validate into an existing accumulator so entity-specific query
    /// checks land in the same report.
    ///
    /// The returned value is only meaningful once `checks` finishes clean;
    /// invalid inputs are replaced with defaults.
    pub fn validate_into<S: SortColumn>(&self, checks: &mut FieldChecks) -> Filters<S> {
        let page = parse_integer(checks, FilterField::Page, self.page.as_deref(), DEFAULT_PAGE);
        let page_size = parse_integer(
            checks,
            FilterField::PageSize,
            self.page_size.as_deref(),
            DEFAULT_PAGE_SIZE,
        );

        checks.check(page > 0, FilterField::Page, "min", "must be greater than zero");
        checks.check(
            page <= MAX_PAGE,
            FilterField::Page,
            "max",
            format!("must be a maximum of {MAX_PAGE}"),
        );
        checks.check(
            page_size > 0,
            FilterField::PageSize,
            "min",
            "must be greater than zero",
        );
        checks.check(
            page_size <= MAX_PAGE_SIZE,
            FilterField::PageSize,
            "max",
            format!("must be a maximum of {MAX_PAGE_SIZE}"),
        );

        let raw_sort = self.sort.as_deref().map(str::trim).unwrap_or_default();
        if !raw_sort.is_empty() {
            let key = raw_sort.strip_prefix('-').unwrap_or(raw_sort);
            checks.check(
                S::parse_key(key).is_some(),
                FilterField::Sort,
                "permitted",
                format!("must be one of: {}", S::allow_list().join(", ")),
            );
        }

        Filters {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            sort: resolve_sort_column(raw_sort),
            direction: resolve_sort_direction(raw_sort),
        }
    }
}

fn parse_integer(checks: &mut FieldChecks, field: FilterField, raw: Option<&str>, default: i64) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            checks.add(field, "integer", "must be an integer value");
            default
        }),
    }
}

/// Validated, bounded paging and sorting for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filters<S: SortColumn> {
    pub page: i64,
    pub page_size: i64,
    pub sort: S,
    pub direction: SortDirection,
}

impl<S: SortColumn> Filters<S> {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// `"<column> <ASC|DESC>, <primary key> ASC"`, built only from static column names.
    pub fn order_by_clause(&self) -> String {
        format!(
            "{} {}, {} ASC",
            self.sort.column(),
            self.direction.as_sql(),
            S::TIEBREAKER
        )
    }

    pub fn metadata(&self, total_records: i64) -> Metadata {
        compute_metadata(total_records, self.page, self.page_size)
    }
}

impl<S: SortColumn> Default for Filters<S> {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: S::default(),
            direction: SortDirection::Ascending,
        }
    }
}
