use serde::Serialize;
use std::fmt::Debug;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

/// Marker prefix on a sort key requesting descending order.
pub const DESCENDING_MARKER: char = '-';

/// A closed set of sortable columns for one list endpoint.
///
/// Implement it on a fieldless enum deriving `strum::EnumIter` and
/// `strum::IntoStaticStr`; the first variant is the `#[default]` and the
/// fallback for anything outside the allow-list.
///
/// ```
/// use query_filters::SortColumn;
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumIter, strum::IntoStaticStr)]
/// #[strum(serialize_all = "snake_case")]
/// enum BookSort {
///     #[default]
///     Id,
///     Title,
/// }
///
/// impl SortColumn for BookSort {
///     const TIEBREAKER: &'static str = "b.id";
///
///     fn column(self) -> &'static str {
///         match self {
///             Self::Id => "b.id",
///             Self::Title => "b.title",
///         }
///     }
/// }
///
/// assert_eq!(BookSort::parse_key("title"), Some(BookSort::Title));
/// assert_eq!(BookSort::parse_key("title; DROP TABLE book"), None);
/// ```
pub trait SortColumn:
    Copy + Default + PartialEq + Debug + IntoEnumIterator + Into<&'static str> + Send + Sync + 'static
{
    /// Primary key column appended to every ORDER BY so pages are stable.
    const TIEBREAKER: &'static str;

    /// SQL column expression for this key.
    fn column(self) -> &'static str;

    /// Client-facing key, as accepted in `?sort=`.
    fn key(self) -> &'static str {
        self.into()
    }

    fn parse_key(key: &str) -> Option<Self> {
        Self::iter().find(|column| column.key() == key)
    }

    fn allow_list() -> Vec<&'static str> {
        Self::iter().map(SortColumn::key).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Resolve a raw `sort` value to a column of the allow-list.
///
/// The descending marker is stripped first. Anything that is not an
/// allow-list key resolves to `S::default()`: caller-supplied text is never
/// returned, so the result is always safe to place into query text.
pub fn resolve_sort_column<S: SortColumn>(raw_sort: &str) -> S {
    let key = raw_sort
        .strip_prefix(DESCENDING_MARKER)
        .unwrap_or(raw_sort);

    if key.is_empty() {
        return S::default();
    }

    S::parse_key(key).unwrap_or_else(|| {
        let fallback = S::default();
        tracing::warn!(
            requested = ?raw_sort,
            fallback = fallback.key(),
            "Sort key outside allow-list, using default column"
        );
        fallback
    })
}

/// A leading `-` means descending, anything else ascending.
pub fn resolve_sort_direction(raw_sort: &str) -> SortDirection {
    if raw_sort.starts_with(DESCENDING_MARKER) {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}
