//! Boolean schema validation.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{type_error, LeafKind, SchemaLike, Shape};

/// A schema for `true`/`false` values.
///
/// With [`coerce`](BooleanSchema::coerce), the text forms submitted by
/// input elements are accepted too: `"true"`, `"on"` and `"1"` read as
/// `true`; `"false"`, `"off"`, `"0"` and `""` read as `false`.
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let agreed = Schema::boolean().coerce();
/// assert_eq!(agreed.validate(&json!("on"), &JsonPath::root()).into_result().unwrap(), true);
/// assert!(agreed.validate(&json!("maybe"), &JsonPath::root()).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct BooleanSchema {
    coerce: bool,
    must_be: Option<bool>,
    type_error_message: Option<String>,
}

impl BooleanSchema {
    /// Creates a new boolean schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the usual text forms of a boolean.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Requires the value to be `true`, as for a terms-of-service checkbox.
    pub fn is_true(mut self) -> Self {
        self.must_be = Some(true);
        self
    }

    /// Sets the message used when the value is not a boolean.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<bool, SchemaErrors> {
        let b = match value {
            Value::Bool(b) => *b,
            Value::String(text) if self.coerce => match parse_flag(text) {
                Some(b) => b,
                None => {
                    return Validation::Failure(type_error(
                        path,
                        self.type_error_message.as_ref(),
                        "expected boolean",
                        "boolean",
                        value,
                    ));
                }
            },
            _ => {
                return Validation::Failure(type_error(
                    path,
                    self.type_error_message.as_ref(),
                    "expected boolean",
                    "boolean",
                    value,
                ));
            }
        };

        match self.must_be {
            Some(expected) if expected != b => Validation::Failure(SchemaErrors::single(
                SchemaError::new(path.clone(), format!("must be {}", expected))
                    .with_code("invalid_literal")
                    .with_expected(expected.to_string())
                    .with_got(b.to_string()),
            )),
            _ => Validation::Success(b),
        }
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

impl SchemaLike for BooleanSchema {
    type Output = bool;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Bool)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Boolean)
    }
}
