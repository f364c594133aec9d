use chrono::{DateTime, Utc};
use query_filters::{FieldChecks, Filters, Metadata, RawFilters, SortColumn, parse_optional};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::rating::round_to_hundredths;

/// Longest accepted product name, in bytes.
pub const MAX_PNAME_BYTES: usize = 255;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier
    pub pid: i64,
    pub pname: String,
    pub product_category: String,
    pub image_url: String,
    /// Mean review rating, two decimals; 0 without reviews
    #[schema(example = 4.33)]
    pub avg_rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Merge the fields present in `input`, leaving the rest untouched.
    pub fn apply_update(&mut self, input: UpdateProduct) {
        if let Some(pname) = input.pname {
            self.pname = pname;
        }
        if let Some(product_category) = input.product_category {
            self.product_category = product_category;
        }
        if let Some(image_url) = input.image_url {
            self.image_url = image_url;
        }
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        check_pname(&mut checks, &self.pname);
        check_category(&mut checks, &self.product_category);
        checks.finish()
    }
}

/// Fields of a product a client may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Pname,
    ProductCategory,
    AvgRating,
}

fn check_pname(checks: &mut FieldChecks, pname: &str) {
    checks.check(
        !pname.trim().is_empty(),
        ProductField::Pname,
        "required",
        "must be provided",
    );
    checks.check(
        pname.len() <= MAX_PNAME_BYTES,
        ProductField::Pname,
        "length",
        format!("must not be more than {MAX_PNAME_BYTES} bytes long"),
    );
}

fn check_category(checks: &mut FieldChecks, category: &str) {
    checks.check(
        !category.trim().is_empty(),
        ProductField::ProductCategory,
        "required",
        "must be provided",
    );
}

/// DTO for creating a new product
///
/// Missing fields deserialize as empty so they surface as field-level
/// validation messages rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProduct {
    #[serde(default)]
    #[schema(example = "Mechanical keyboard")]
    pub pname: String,
    #[serde(default)]
    #[schema(example = "peripherals")]
    pub product_category: String,
    #[serde(default)]
    pub image_url: String,
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        check_pname(&mut checks, &self.pname);
        check_category(&mut checks, &self.product_category);
        checks.finish()
    }
}

/// DTO for a partial product update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    pub pname: Option<String>,
    pub product_category: Option<String>,
    pub image_url: Option<String>,
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        if let Some(pname) = &self.pname {
            check_pname(&mut checks, pname);
        }
        if let Some(category) = &self.product_category {
            check_category(&mut checks, category);
        }
        checks.finish()
    }
}

/// Sortable product columns. `?sort=-avg_rating` sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Pid,
    Pname,
    ProductCategory,
    AvgRating,
    CreatedAt,
}

impl SortColumn for ProductSort {
    const TIEBREAKER: &'static str = "p.pid";

    fn column(self) -> &'static str {
        match self {
            Self::Pid => "p.pid",
            Self::Pname => "p.pname",
            Self::ProductCategory => "p.product_category",
            Self::AvgRating => "p.avg_rating",
            Self::CreatedAt => "p.created_at",
        }
    }
}

/// Entity filters for product listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of `pname`
    pub pname: Option<String>,
    /// Case-insensitive substring of `product_category`
    pub product_category: Option<String>,
    /// Exact average, compared on the two-decimal grid
    pub avg_rating: Option<f64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        contains_ignore_case(&product.pname, self.pname.as_deref())
            && contains_ignore_case(&product.product_category, self.product_category.as_deref())
            && self
                .avg_rating
                .is_none_or(|avg| product.avg_rating == avg)
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
}

/// Raw query string of `GET /products`.
///
/// Everything arrives as text so that bad numbers are reported per field
/// together with paging errors.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Case-insensitive substring of the product name
    pub pname: Option<String>,
    /// Case-insensitive substring of the category
    pub product_category: Option<String>,
    /// Exact average rating, e.g. `4.5`
    pub avg_rating: Option<String>,
    /// Page number, 1..=500 (default 1)
    pub page: Option<String>,
    /// Page size, 1..=100 (default 10)
    pub page_size: Option<String>,
    /// One of pid, pname, product_category, avg_rating, created_at; `-` prefix for descending
    pub sort: Option<String>,
}

impl ProductListQuery {
    /// Validate every parameter, reporting all problems at once.
    pub fn into_parts(self) -> Result<(ProductFilter, Filters<ProductSort>), ValidationErrors> {
        let mut checks = FieldChecks::new();

        let avg_rating = parse_optional::<f64, _>(
            &mut checks,
            ProductField::AvgRating,
            self.avg_rating.as_deref(),
        );
        if let Some(avg) = avg_rating {
            checks.check(
                (0.0..=5.0).contains(&avg),
                ProductField::AvgRating,
                "range",
                "must be between 0 and 5",
            );
        }

        let filters = RawFilters {
            page: self.page,
            page_size: self.page_size,
            sort: self.sort,
        }
        .validate_into::<ProductSort>(&mut checks);

        checks.finish()?;

        let filter = ProductFilter {
            pname: non_blank(self.pname),
            product_category: non_blank(self.product_category),
            avg_rating: avg_rating.map(round_to_hundredths),
        };
        Ok((filter, filters))
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `{"product": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductEnvelope {
    pub product: Product,
}

/// `{"products": [...], "@metadata": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductsEnvelope {
    pub products: Vec<Product>,
    #[serde(rename = "@metadata")]
    pub metadata: Metadata,
}
