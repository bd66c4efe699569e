//! Numeric schema validation.
//!
//! This module provides [`IntegerSchema`] and [`NumberSchema`] for validating
//! numeric values with constraints like minimum/maximum value and sign
//! requirements. Both can opt into coercion of numeric text, the form in
//! which input elements report numbers.

use std::fmt::Display;
use std::ops::RangeInclusive;

use serde_json::{Number, Value};
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{finish, type_error, LeafKind, SchemaLike, Shape};

#[derive(Clone)]
enum NumericConstraint<T> {
    Min { value: T, message: Option<String> },
    Max { value: T, message: Option<String> },
    Positive { message: Option<String> },
    NonNegative { message: Option<String> },
    Negative { message: Option<String> },
}

impl<T> NumericConstraint<T> {
    fn message_mut(&mut self) -> &mut Option<String> {
        match self {
            NumericConstraint::Min { message, .. }
            | NumericConstraint::Max { message, .. }
            | NumericConstraint::Positive { message }
            | NumericConstraint::NonNegative { message }
            | NumericConstraint::Negative { message } => message,
        }
    }
}

/// A schema for validating integer values.
///
/// `IntegerSchema` validates that values are integers (not floats) and
/// optionally applies constraints. All violations are accumulated.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::integer().min(0).max(100);
///
/// assert!(schema.validate(&json!(50), &JsonPath::root()).is_success());
/// assert!(schema.validate(&json!(-5), &JsonPath::root()).is_failure());
/// assert!(schema.validate(&json!(1.5), &JsonPath::root()).is_failure());
///
/// // Text is accepted only after opting in
/// assert!(schema.validate(&json!("42"), &JsonPath::root()).is_failure());
/// assert!(schema.clone().coerce().validate(&json!("42"), &JsonPath::root()).is_success());
/// ```
#[derive(Clone)]
pub struct IntegerSchema {
    constraints: Vec<NumericConstraint<i64>>,
    coerce: bool,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    /// Creates a new integer schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            coerce: false,
            type_error_message: None,
        }
    }

    /// Accepts integer text such as `"42"` in addition to JSON integers.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: i64) -> Self {
        self.constraints.push(NumericConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: i64) -> Self {
        self.constraints.push(NumericConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Adds both minimum and maximum constraints from an inclusive range.
    ///
    /// Equivalent to `.min(start).max(end)`; both ends are accepted.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let age = Schema::integer().range(18..=120);
    ///
    /// assert!(age.validate(&json!(18), &JsonPath::root()).is_success());
    /// assert!(age.validate(&json!(120), &JsonPath::root()).is_success());
    ///
    /// let errors = age.validate(&json!(7), &JsonPath::root()).into_result().unwrap_err();
    /// assert_eq!(errors.first().code, "min_value");
    /// ```
    pub fn range(self, range: RangeInclusive<i64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Requires the value to be greater than zero.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumericConstraint::Positive { message: None });
        self
    }

    /// Requires the value to be zero or greater.
    pub fn non_negative(mut self) -> Self {
        self.constraints
            .push(NumericConstraint::NonNegative { message: None });
        self
    }

    /// Requires the value to be less than zero.
    pub fn negative(mut self) -> Self {
        self.constraints
            .push(NumericConstraint::Negative { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(last) => *last.message_mut() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<i64, SchemaErrors> {
        let n = match value {
            Value::Number(num) if num.is_i64() || num.is_u64() => match num.as_i64() {
                Some(n) => n,
                None => {
                    let message = self
                        .type_error_message
                        .clone()
                        .unwrap_or_else(|| "integer value too large for i64".to_string());
                    return Validation::Failure(SchemaErrors::single(
                        SchemaError::new(path.clone(), message)
                            .with_code("overflow")
                            .with_got(num.to_string())
                            .with_expected("integer in i64 range"),
                    ));
                }
            },
            Value::Number(_) => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "expected integer, got float".to_string());
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got("float")
                        .with_expected("integer"),
                ));
            }
            Value::String(text) if self.coerce => match text.trim().parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    return Validation::Failure(not_numeric(
                        path,
                        self.type_error_message.as_ref(),
                        "expected integer",
                        "integer",
                        text,
                    ));
                }
            },
            _ => {
                return Validation::Failure(type_error(
                    path,
                    self.type_error_message.as_ref(),
                    "expected integer",
                    "integer",
                    value,
                ));
            }
        };

        finish(n, check_all(&self.constraints, n, 0, path))
    }
}

impl Default for IntegerSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for IntegerSchema {
    type Output = i64;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(|n| Value::Number(n.into()))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Integer)
    }
}

/// A schema for validating finite numbers, integral or not.
///
/// JSON numbers pass through unchanged. Coerced text is normalised to a JSON
/// integer when it has no fractional part, so `"18"` becomes `18`.
///
/// ```rust
/// use formwork::{JsonPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let age = Schema::number().min(13.0).coerce();
///
/// let result = age.validate_to_value(&json!("18"), &JsonPath::root());
/// assert_eq!(result.into_result().unwrap(), json!(18));
///
/// let errors = age.validate(&json!(9.5), &JsonPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().code, "min_value");
/// ```
#[derive(Clone)]
pub struct NumberSchema {
    constraints: Vec<NumericConstraint<f64>>,
    coerce: bool,
    type_error_message: Option<String>,
}

impl NumberSchema {
    /// Creates a new number schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            coerce: false,
            type_error_message: None,
        }
    }

    /// Accepts numeric text such as `"4.5"` in addition to JSON numbers.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: f64) -> Self {
        self.constraints.push(NumericConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: f64) -> Self {
        self.constraints.push(NumericConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Requires the value to be greater than zero.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumericConstraint::Positive { message: None });
        self
    }

    /// Requires the value to be zero or greater.
    pub fn non_negative(mut self) -> Self {
        self.constraints
            .push(NumericConstraint::NonNegative { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(last) => *last.message_mut() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<f64, SchemaErrors> {
        self.check(value, path).map(|(n, _)| n)
    }

    fn check(&self, value: &Value, path: &JsonPath) -> Validation<(f64, Value), SchemaErrors> {
        let (n, normalised) = match value {
            Value::Number(num) => match num.as_f64() {
                Some(n) => (n, value.clone()),
                None => {
                    return Validation::Failure(type_error(
                        path,
                        self.type_error_message.as_ref(),
                        "expected number",
                        "number",
                        value,
                    ));
                }
            },
            Value::String(text) if self.coerce => match parse_finite(text) {
                Some(n) => (n, number_value(n)),
                None => {
                    return Validation::Failure(not_numeric(
                        path,
                        self.type_error_message.as_ref(),
                        "expected number",
                        "number",
                        text,
                    ));
                }
            },
            _ => {
                return Validation::Failure(type_error(
                    path,
                    self.type_error_message.as_ref(),
                    "expected number",
                    "number",
                    value,
                ));
            }
        };

        finish((n, normalised), check_all(&self.constraints, n, 0.0, path))
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for NumberSchema {
    type Output = f64;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.check(value, path).map(|(_, v)| v)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Number)
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn not_numeric(
    path: &JsonPath,
    custom: Option<&String>,
    default_message: &str,
    expected: &str,
    text: &str,
) -> SchemaErrors {
    let message = custom
        .cloned()
        .unwrap_or_else(|| default_message.to_string());
    SchemaErrors::single(
        SchemaError::new(path.clone(), message)
            .with_code("invalid_type")
            .with_got(format!("\"{}\"", text))
            .with_expected(expected.to_string()),
    )
}

fn check_all<T>(
    constraints: &[NumericConstraint<T>],
    value: T,
    zero: T,
    path: &JsonPath,
) -> Vec<SchemaError>
where
    T: PartialOrd + Display + Copy,
{
    constraints
        .iter()
        .filter_map(|c| check_constraint(c, value, zero, path))
        .collect()
}

fn check_constraint<T>(
    constraint: &NumericConstraint<T>,
    value: T,
    zero: T,
    path: &JsonPath,
) -> Option<SchemaError>
where
    T: PartialOrd + Display + Copy,
{
    let (code, default_message, expected, message) = match constraint {
        NumericConstraint::Min { value: min, message } if value < *min => (
            "min_value",
            format!("must be at least {}, got {}", min, value),
            format!("at least {}", min),
            message,
        ),
        NumericConstraint::Max { value: max, message } if value > *max => (
            "max_value",
            format!("must be at most {}, got {}", max, value),
            format!("at most {}", max),
            message,
        ),
        NumericConstraint::Positive { message } if value <= zero => (
            "positive",
            format!("must be positive, got {}", value),
            "value > 0".to_string(),
            message,
        ),
        NumericConstraint::NonNegative { message } if value < zero => (
            "non_negative",
            format!("must be non-negative, got {}", value),
            "value >= 0".to_string(),
            message,
        ),
        NumericConstraint::Negative { message } if value >= zero => (
            "negative",
            format!("must be negative, got {}", value),
            "value < 0".to_string(),
            message,
        ),
        _ => return None,
    };

    Some(
        SchemaError::new(path.clone(), message.clone().unwrap_or(default_message))
            .with_code(code)
            .with_expected(expected)
            .with_got(value.to_string()),
    )
}
