//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating JSON objects with
//! typed fields, optional fields, default values, additional property
//! handling and cross-field checks.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{finish, type_error, SchemaLike, Shape, ValueValidator};
use super::wrappers::{DefaultSchema, OptionalSchema};

type CrossFieldCheck =
    Box<dyn Fn(&Map<String, Value>, &JsonPath) -> Validation<(), SchemaErrors> + Send + Sync>;

/// How to handle properties not defined in the schema.
enum AdditionalProperties {
    /// Keep unknown properties in the output (default behavior).
    Allow,
    /// Reject unknown properties.
    Deny,
    /// Validate unknown properties against a schema.
    Validate(Box<dyn ValueValidator>),
}

/// A schema for validating JSON objects.
///
/// Fields are validated independently and every issue is accumulated. A key
/// absent from the input is judged by its field's schema: plain fields are
/// required, [`optional`](ObjectSchema::optional) fields may be left out and
/// [`default`](ObjectSchema::default) fields take their declared default.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::number().min(13.0))
///     .optional("email", Schema::string().email())
///     .default("role", Schema::string(), json!("user"));
///
/// let out = schema.validate(&json!({"name": "john", "age": 18}), &JsonPath::root());
/// assert_eq!(
///     serde_json::Value::Object(out.into_result().unwrap()),
///     json!({"name": "john", "age": 18, "role": "user"})
/// );
///
/// let errors = schema.validate(&json!({"name": "john"}), &JsonPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().path, JsonPath::from_field("age"));
/// assert_eq!(errors.first().code, "required");
/// ```
pub struct ObjectSchema {
    fields: IndexMap<String, Box<dyn ValueValidator>>,
    additional_properties: AdditionalProperties,
    checks: Vec<CrossFieldCheck>,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            additional_properties: AdditionalProperties::Allow,
            checks: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a field. Whether it may be absent is decided by `schema`.
    pub fn field<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(name.into(), Box::new(schema));
        self
    }

    /// Adds a field that may be absent.
    pub fn optional<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.field(name, OptionalSchema::new(schema))
    }

    /// Adds a field that takes `default` when absent.
    ///
    /// The default is also what a fresh form shows for the field before any
    /// interaction.
    pub fn default<S>(self, name: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.field(name, DefaultSchema::new(schema, default))
    }

    /// Configures how unknown properties are handled.
    ///
    /// Accepts `true` (keep them), `false` (reject them) or a schema to
    /// validate them against.
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let strict = Schema::object()
    ///     .field("name", Schema::string())
    ///     .additional_properties(false);
    ///
    /// let errors = strict
    ///     .validate(&json!({"name": "Alice", "unknown": 1}), &JsonPath::root())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().code, "additional_property");
    /// ```
    pub fn additional_properties<S>(mut self, setting: S) -> Self
    where
        S: Into<AdditionalPropertiesSetting>,
    {
        self.additional_properties = setting.into().0;
        self
    }

    /// Adds a cross-field check.
    ///
    /// Checks run in order against the validated object, only once every
    /// field has passed.
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&Map<String, Value>, &JsonPath) -> Validation<(), SchemaErrors> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Sets a custom error message for type errors.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Returns the schema declared for `name`.
    pub fn get_field(&self, name: &str) -> Option<&dyn ValueValidator> {
        self.fields.get(name).map(Box::as_ref)
    }

    /// Returns the declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Validates a value against this schema.
    pub fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
    ) -> Validation<Map<String, Value>, SchemaErrors> {
        let Some(obj) = value.as_object() else {
            return Validation::Failure(type_error(
                path,
                self.type_error_message.as_ref(),
                "expected object",
                "object",
                value,
            ));
        };

        let mut errors = Vec::new();
        let mut validated = Map::new();

        for (name, schema) in &self.fields {
            let field_path = path.push_field(name);
            match schema.validate_option(obj.get(name), &field_path) {
                Validation::Success(Some(v)) => {
                    validated.insert(name.clone(), v);
                }
                Validation::Success(None) => {}
                Validation::Failure(e) => errors.extend(e),
            }
        }

        for (key, value) in obj {
            if self.fields.contains_key(key) {
                continue;
            }
            let field_path = path.push_field(key);
            match &self.additional_properties {
                AdditionalProperties::Allow => {
                    validated.insert(key.clone(), value.clone());
                }
                AdditionalProperties::Deny => {
                    errors.push(
                        SchemaError::new(field_path, format!("unknown field '{}'", key))
                            .with_code("additional_property"),
                    );
                }
                AdditionalProperties::Validate(schema) => {
                    match schema.validate_value(value, &field_path) {
                        Validation::Success(v) => {
                            validated.insert(key.clone(), v);
                        }
                        Validation::Failure(e) => errors.extend(e),
                    }
                }
            }
        }

        if errors.is_empty() {
            for check in &self.checks {
                if let Validation::Failure(e) = check(&validated, path) {
                    errors.extend(e);
                }
            }
        }

        finish(validated, errors)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    type Output = Map<String, Value>;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Object)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Object(
            self.fields
                .iter()
                .map(|(name, schema)| (name.as_str(), schema.as_ref()))
                .collect(),
        )
    }
}

/// A type that can be converted into an additional-properties setting.
///
/// - `bool`: `true` keeps unknown properties, `false` rejects them
/// - any schema: unknown properties are validated against it
pub struct AdditionalPropertiesSetting(AdditionalProperties);

impl From<bool> for AdditionalPropertiesSetting {
    fn from(allow: bool) -> Self {
        if allow {
            AdditionalPropertiesSetting(AdditionalProperties::Allow)
        } else {
            AdditionalPropertiesSetting(AdditionalProperties::Deny)
        }
    }
}

impl<S: SchemaLike + 'static> From<S> for AdditionalPropertiesSetting {
    fn from(schema: S) -> Self {
        AdditionalPropertiesSetting(AdditionalProperties::Validate(Box::new(schema)))
    }
}
