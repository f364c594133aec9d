//! Field-check accumulator shared by entity validators and the filter validator.

use std::borrow::Cow;
use std::str::FromStr;
use validator::{ValidationError, ValidationErrors};

/// Collects every failed check into a single [`ValidationErrors`] report.
///
/// Fields are enumerated identifiers (anything convertible to `&'static str`,
/// typically a `strum::IntoStaticStr` enum), never free-form strings. Checks
/// never short-circuit: all of them run and all failures are reported together.
///
/// # Example
/// ```
/// use query_filters::FieldChecks;
///
/// #[derive(Clone, Copy, strum::IntoStaticStr)]
/// #[strum(serialize_all = "snake_case")]
/// enum Field { Name, Rating }
///
/// let mut checks = FieldChecks::new();
/// checks.check(false, Field::Name, "required", "must be provided");
/// checks.check(6 <= 5, Field::Rating, "range", "must be between 1 and 5");
///
/// let report = checks.finish().unwrap_err();
/// assert_eq!(report.field_errors().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FieldChecks {
    errors: ValidationErrors,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check<F>(
        &mut self,
        ok: bool,
        field: F,
        code: &'static str,
        message: impl Into<Cow<'static, str>>,
    ) where
        F: Into<&'static str>,
    {
        if !ok {
            self.add(field, code, message);
        }
    }

    /// Record a failure unconditionally.
    pub fn add<F>(&mut self, field: F, code: &'static str, message: impl Into<Cow<'static, str>>)
    where
        F: Into<&'static str>,
    {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        self.errors.add(field.into(), error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when no check failed, otherwise the full report.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

impl Default for FieldChecks {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `value` is one of `allowed`.
pub fn permitted_value<T: PartialEq>(value: &T, allowed: &[T]) -> bool {
    allowed.contains(value)
}

/// Parse an optional numeric query value.
///
/// Absent or blank input yields `None`. Unparsable input records a
/// `"must be a valid number"` failure against `field` and also yields `None`.
pub fn parse_optional<T, F>(checks: &mut FieldChecks, field: F, raw: Option<&str>) -> Option<T>
where
    T: FromStr,
    F: Into<&'static str>,
{
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            checks.add(field, "number", "must be a valid number");
            None
        }
    }
}
