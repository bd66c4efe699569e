//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for validating arrays with an item
//! schema, length constraints and uniqueness requirements.

use serde_json::Value;
use stillwater::Validation;

use crate::deep;
use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{finish, type_error, SchemaLike, Shape};

enum ArrayConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Unique {
        message: Option<String>,
    },
    UniqueBy {
        key_fn: Box<dyn Fn(&Value) -> Value + Send + Sync>,
        message: Option<String>,
    },
}

/// A schema for validating arrays whose items all match one schema.
///
/// Item issues carry the item's index in their path, and are accumulated
/// together with length and uniqueness violations.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let flowers = Schema::array(Schema::string().min_len(1)).non_empty();
///
/// assert!(flowers.validate(&json!(["rose"]), &JsonPath::root()).is_success());
///
/// let errors = flowers.validate(&json!(["rose", ""]), &JsonPath::root()).into_result().unwrap_err();
/// assert_eq!(errors.first().path, JsonPath::from_index(1));
/// ```
pub struct ArraySchema<S> {
    item_schema: S,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> ArraySchema<S> {
    /// Creates an array schema for items matching `item_schema`.
    pub fn new(item_schema: S) -> Self {
        Self {
            item_schema,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Requires at least `min` items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let flowers = Schema::array(Schema::string()).min_len(1);
    ///
    /// assert!(flowers.validate(&json!(["tulip"]), &JsonPath::root()).is_success());
    /// assert!(flowers.validate(&json!([]), &JsonPath::root()).is_failure());
    /// ```
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinLength { min, message: None });
        self
    }

    /// Allows at most `max` items.
    ///
    /// The issue sits on the array itself, not on the extra items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let tags = Schema::array(Schema::string()).max_len(2);
    /// let path = JsonPath::from_field("tags");
    ///
    /// let errors = tags
    ///     .validate(&json!(["a", "b", "c"]), &path)
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.len(), 1);
    /// assert_eq!(errors.first().path, path);
    /// assert_eq!(errors.first().code, "max_length");
    /// ```
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires at least one item.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Requires all items to be distinct under deep equality.
    ///
    /// Each group of duplicates is reported once, naming every index in it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let emails = Schema::array(Schema::string()).unique();
    ///
    /// assert!(emails.validate(&json!(["a@x.io", "b@x.io"]), &JsonPath::root()).is_success());
    ///
    /// let errors = emails
    ///     .validate(&json!(["a@x.io", "b@x.io", "a@x.io"]), &JsonPath::root())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.len(), 1);
    /// assert_eq!(errors.first().message, "duplicate value at indices [0, 2]");
    /// ```
    pub fn unique(mut self) -> Self {
        self.constraints
            .push(ArrayConstraint::Unique { message: None });
        self
    }

    /// Requires the keys extracted by `key_fn` to be distinct.
    pub fn unique_by<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.constraints.push(ArrayConstraint::UniqueBy {
            key_fn: Box::new(key_fn),
            message: None,
        });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                ArrayConstraint::MinLength { message: m, .. }
                | ArrayConstraint::MaxLength { message: m, .. }
                | ArrayConstraint::Unique { message: m }
                | ArrayConstraint::UniqueBy { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Returns the item schema.
    pub fn item_schema(&self) -> &S {
        &self.item_schema
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Vec<Value>, SchemaErrors> {
        let Some(arr) = value.as_array() else {
            return Validation::Failure(type_error(
                path,
                self.type_error_message.as_ref(),
                "expected array",
                "array",
                value,
            ));
        };

        let mut errors = Vec::new();

        for constraint in &self.constraints {
            match constraint {
                ArrayConstraint::MinLength { min, message } if arr.len() < *min => {
                    let msg = message.clone().unwrap_or_else(|| {
                        format!("array must have at least {} items, got {}", min, arr.len())
                    });
                    errors.push(
                        SchemaError::new(path.clone(), msg)
                            .with_code("min_length")
                            .with_expected(format!("at least {} items", min))
                            .with_got(format!("{} items", arr.len())),
                    );
                }
                ArrayConstraint::MaxLength { max, message } if arr.len() > *max => {
                    let msg = message.clone().unwrap_or_else(|| {
                        format!("array must have at most {} items, got {}", max, arr.len())
                    });
                    errors.push(
                        SchemaError::new(path.clone(), msg)
                            .with_code("max_length")
                            .with_expected(format!("at most {} items", max))
                            .with_got(format!("{} items", arr.len())),
                    );
                }
                _ => {}
            }
        }

        let mut validated_items = Vec::with_capacity(arr.len());
        for (index, item) in arr.iter().enumerate() {
            let item_path = path.push_index(index);
            match self.item_schema.validate_to_value(item, &item_path) {
                Validation::Success(v) => validated_items.push(v),
                Validation::Failure(e) => errors.extend(e),
            }
        }

        for constraint in &self.constraints {
            let (groups, message, noun) = match constraint {
                ArrayConstraint::Unique { message } => {
                    (duplicate_groups(arr, |v| v.clone()), message, "value")
                }
                ArrayConstraint::UniqueBy { key_fn, message } => {
                    (duplicate_groups(arr, key_fn), message, "key")
                }
                _ => continue,
            };
            for indices in groups {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("duplicate {} at indices {:?}", noun, indices));
                errors.push(
                    SchemaError::new(path.clone(), msg)
                        .with_code("unique")
                        .with_got(format!("duplicates at indices {:?}", indices)),
                );
            }
        }

        finish(validated_items, errors)
    }
}

impl<S: SchemaLike> SchemaLike for ArraySchema<S> {
    type Output = Vec<Value>;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::Array)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Array(&self.item_schema)
    }
}

/// Groups indices of items whose keys are deep-equal; only groups with more
/// than one member are returned, in order of first occurrence.
fn duplicate_groups<F>(arr: &[Value], key_fn: F) -> Vec<Vec<usize>>
where
    F: Fn(&Value) -> Value,
{
    let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
    for (i, item) in arr.iter().enumerate() {
        let key = key_fn(item);
        match groups.iter_mut().find(|(seen, _)| deep::equal(seen, &key)) {
            Some((_, indices)) => indices.push(i),
            None => groups.push((key, vec![i])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(_, indices)| indices)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IntegerSchema, ObjectSchema, Schema, StringSchema};
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_rejects_non_array() {
        let schema = ArraySchema::new(StringSchema::new());
        let errors = unwrap_failure(schema.validate(&json!({"0": "a"}), &JsonPath::root()));
        assert_eq!(errors.first().code, "invalid_type");
        assert_eq!(errors.first().got.as_deref(), Some("object"));
    }

    #[test]
    fn test_item_errors_carry_index() {
        let schema = ArraySchema::new(
            ObjectSchema::new().field("name", StringSchema::new().min_len(1)),
        );
        let errors = unwrap_failure(schema.validate(
            &json!([{"name": "ok"}, {"name": ""}]),
            &JsonPath::from_field("flowers"),
        ));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().path.to_string(), "flowers[1].name");
    }

    #[test]
    fn test_length_constraints() {
        let schema = ArraySchema::new(IntegerSchema::new()).min_len(2).max_len(3);
        assert!(schema.validate(&json!([1, 2]), &JsonPath::root()).is_success());
        assert_eq!(
            unwrap_failure(schema.validate(&json!([1]), &JsonPath::root())).first().code,
            "min_length"
        );
        assert_eq!(
            unwrap_failure(schema.validate(&json!([1, 2, 3, 4]), &JsonPath::root())).first().code,
            "max_length"
        );
    }

    #[test]
    fn test_unique_uses_deep_equality() {
        let schema = Schema::array(Schema::any()).unique();
        let errors = unwrap_failure(schema.validate(
            &json!([{"a": 1, "b": 2}, 3, {"b": 2, "a": 1}, 3]),
            &JsonPath::root(),
        ));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().got.as_deref(), Some("duplicates at indices [0, 2]"));
    }

    #[test]
    fn test_unique_by_key() {
        let schema = ArraySchema::new(Schema::any())
            .unique_by(|v| v.get("id").cloned().unwrap_or(Value::Null))
            .error("ids must be unique");
        let errors = unwrap_failure(schema.validate(
            &json!([{"id": 1}, {"id": 2}, {"id": 1}]),
            &JsonPath::root(),
        ));
        assert_eq!(errors.first().message, "ids must be unique");
    }

    #[test]
    fn test_shape_exposes_item_schema() {
        let schema = ArraySchema::new(StringSchema::new());
        assert!(matches!(SchemaLike::shape(&schema), Shape::Array(_)));
    }
}
