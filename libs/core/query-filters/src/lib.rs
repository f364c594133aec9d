//! Pagination, filtering and sorting primitives for list endpoints.
//!
//! Raw query-string values go in, a bounded [`Filters`] value comes out:
//!
//! ```text
//! ?page=2&page_size=20&sort=-rating
//!        │
//! ┌──────▼──────┐
//! │ RawFilters  │  ← unparsed strings from the query string
//! └──────┬──────┘
//!        │ validate::<S>()   (every violation collected)
//! ┌──────▼──────┐
//! │ Filters<S>  │  ← page, page_size, closed sort enum, direction
//! └──────┬──────┘
//!        │ limit() / offset() / order_by_clause()
//! ┌──────▼──────┐
//! │  Metadata   │  ← computed from the total row count
//! └─────────────┘
//! ```
//!
//! Sort keys are closed enums implementing [`SortColumn`], so only
//! `&'static str` column names ever reach query text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use query_filters::{RawFilters, SortColumn};
//!
//! let filters = raw.validate::<ProductSort>()?;
//! let sql = format!(
//!     "SELECT ... ORDER BY {} LIMIT $1 OFFSET $2",
//!     filters.order_by_clause()
//! );
//! let metadata = filters.metadata(total_records);
//! ```

pub mod checks;
pub mod filters;
pub mod metadata;
pub mod sort;

pub use checks::{FieldChecks, parse_optional, permitted_value};
pub use filters::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, FilterField, Filters, MAX_PAGE, MAX_PAGE_SIZE, RawFilters,
};
pub use metadata::{Metadata, compute_metadata};
pub use sort::{SortColumn, SortDirection, resolve_sort_column, resolve_sort_direction};

// Re-exported so callers can name the report type without a direct dependency
pub use validator::ValidationErrors;
