//! Fixed-value leaves: enumerations, literals and the catch-all.

use serde_json::Value;
use stillwater::Validation;

use crate::deep;
use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{LeafKind, SchemaLike, Shape};

/// A schema accepting one of a fixed set of values.
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let color = Schema::enumeration(["red", "green", "blue"]);
/// assert!(color.validate(&json!("green"), &JsonPath::root()).is_success());
///
/// let errors = color.validate(&json!("pink"), &JsonPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().code, "invalid_enum_value");
/// ```
#[derive(Clone)]
pub struct EnumSchema {
    options: Vec<Value>,
    message: Option<String>,
}

impl EnumSchema {
    /// Creates an enumeration of `options`.
    pub fn new<I, V>(options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// The accepted values, in declaration order.
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    /// Sets the message used when the value is not one of the options.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        if self.options.iter().any(|option| deep::equal(option, value)) {
            return Validation::Success(value.clone());
        }
        let listed = self
            .options
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("expected one of {}", listed));
        Validation::Failure(SchemaErrors::single(
            SchemaError::new(path.clone(), message)
                .with_code("invalid_enum_value")
                .with_expected(listed)
                .with_got(value.to_string()),
        ))
    }
}

impl SchemaLike for EnumSchema {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Enum)
    }
}

/// A schema accepting exactly one value.
#[derive(Clone)]
pub struct LiteralSchema {
    expected: Value,
}

impl LiteralSchema {
    /// Creates a literal for `expected`.
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        if deep::equal(&self.expected, value) {
            Validation::Success(value.clone())
        } else {
            Validation::Failure(SchemaErrors::single(
                SchemaError::new(path.clone(), format!("expected {}", self.expected))
                    .with_code("invalid_literal")
                    .with_expected(self.expected.to_string())
                    .with_got(value.to_string()),
            ))
        }
    }
}

impl SchemaLike for LiteralSchema {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Literal)
    }
}

/// A schema accepting any present value, `null` included.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnySchema;

impl SchemaLike for AnySchema {
    type Output = Value;

    fn validate(&self, value: &Value, _path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        Validation::Success(value.clone())
    }

    fn validate_to_value(&self, value: &Value, _path: &JsonPath) -> Validation<Value, SchemaErrors> {
        Validation::Success(value.clone())
    }
}
