//! Date schema validation.
//!
//! Dates travel through drafts as text. [`DateSchema`] accepts RFC 3339
//! timestamps and plain `YYYY-MM-DD` dates (as reported by date inputs) and
//! normalises both to an RFC 3339 timestamp in UTC.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{finish, type_error, LeafKind, SchemaLike, Shape};

/// A schema for points in time.
///
/// ```rust
/// use formwork::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::date();
/// let out = schema.validate_to_value(&json!("2024-03-01"), &JsonPath::root());
/// assert_eq!(out.into_result().unwrap(), json!("2024-03-01T00:00:00Z"));
/// ```
#[derive(Clone, Default)]
pub struct DateSchema {
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    type_error_message: Option<String>,
}

impl DateSchema {
    /// Creates a new date schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the date to be no earlier than `min`.
    pub fn min(mut self, min: DateTime<Utc>) -> Self {
        self.min = Some(min);
        self
    }

    /// Requires the date to be no later than `max`.
    pub fn max(mut self, max: DateTime<Utc>) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the message used when the value is not a date.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<DateTime<Utc>, SchemaErrors> {
        let Some(text) = value.as_str() else {
            return Validation::Failure(type_error(
                path,
                self.type_error_message.as_ref(),
                "expected date",
                "date",
                value,
            ));
        };

        let Some(instant) = parse_date(text) else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "invalid date".to_string());
            return Validation::Failure(SchemaErrors::single(
                SchemaError::new(path.clone(), message)
                    .with_code("invalid_date")
                    .with_expected("RFC 3339 timestamp or YYYY-MM-DD")
                    .with_got(text.to_string()),
            ));
        };

        let mut errors = Vec::new();
        if let Some(min) = self.min.filter(|min| instant < *min) {
            errors.push(
                SchemaError::new(path.clone(), format!("must be on or after {}", render(min)))
                    .with_code("min_date")
                    .with_got(render(instant)),
            );
        }
        if let Some(max) = self.max.filter(|max| instant > *max) {
            errors.push(
                SchemaError::new(path.clone(), format!("must be on or before {}", render(max)))
                    .with_code("max_date")
                    .with_got(render(instant)),
            );
        }

        finish(instant, errors)
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn render(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl SchemaLike for DateSchema {
    type Output = DateTime<Utc>;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(|d| Value::String(render(d)))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Date)
    }
}
