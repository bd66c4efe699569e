//! Schema combinators for composing validation logic.
//!
//! - [`UnionSchema`]: at least one alternative must match; the first match wins
//! - [`IntersectionSchema`]: both sides must match; object outputs are merged
//!
//! # Example
//!
//! ```rust
//! use formwork::{JsonPath, Schema, ValueValidator};
//! use serde_json::json;
//!
//! // Flexible type: string or integer ID
//! let id = Schema::union(vec![
//!     Box::new(Schema::string().min_len(1)) as Box<dyn ValueValidator>,
//!     Box::new(Schema::integer().positive()),
//! ]);
//!
//! assert!(id.validate(&json!("abc"), &JsonPath::root()).is_success());
//! assert!(id.validate(&json!(7), &JsonPath::root()).is_success());
//! assert!(id.validate(&json!(true), &JsonPath::root()).is_failure());
//! ```

use serde_json::{Map, Value};
use stillwater::prelude::*;

use crate::deep;
use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{SchemaLike, Shape, ValueValidator};

/// A schema matched by any one of its alternatives.
///
/// Alternatives are tried in order and the first that passes produces the
/// output. When none passes, the issues of the alternative that came closest
/// (fewest issues, earliest on ties) are reported, so they stay addressable by
/// field path. A union with no alternatives rejects everything.
pub struct UnionSchema {
    alternatives: Vec<Box<dyn ValueValidator>>,
}

impl UnionSchema {
    /// Creates a union of `alternatives`.
    pub fn new(alternatives: Vec<Box<dyn ValueValidator>>) -> Self {
        Self { alternatives }
    }

    /// Adds another alternative.
    pub fn or<S: SchemaLike + 'static>(mut self, alternative: S) -> Self {
        self.alternatives.push(Box::new(alternative));
        self
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.first_match(path, |alt| alt.validate_value(value, path))
    }

    fn first_match<T>(
        &self,
        path: &JsonPath,
        attempt: impl Fn(&dyn ValueValidator) -> Validation<T, SchemaErrors>,
    ) -> Validation<T, SchemaErrors> {
        let mut closest: Option<SchemaErrors> = None;
        for alternative in &self.alternatives {
            match attempt(alternative.as_ref()) {
                Validation::Success(v) => return Validation::Success(v),
                Validation::Failure(e) => {
                    if closest.as_ref().map_or(true, |best| e.len() < best.len()) {
                        closest = Some(e);
                    }
                }
            }
        }
        Validation::Failure(closest.unwrap_or_else(|| {
            SchemaErrors::single(
                SchemaError::new(path.clone(), "no union alternatives declared")
                    .with_code("invalid_union"),
            )
        }))
    }
}

impl SchemaLike for UnionSchema {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.first_match(path, |alt| alt.validate_absent(path))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Union(self.alternatives.iter().map(Box::as_ref).collect())
    }

    fn default_value(&self) -> Option<Value> {
        self.alternatives
            .iter()
            .find_map(|alternative| alternative.declared_default())
    }
}

/// A schema matched only when both sides match.
///
/// Issues from both sides accumulate. When both outputs are objects they are
/// merged, the right side winning on shared keys; any other pair of outputs
/// must be deep-equal.
pub struct IntersectionSchema<A, B> {
    left: A,
    right: B,
}

impl<A: SchemaLike, B: SchemaLike> IntersectionSchema<A, B> {
    /// Creates the intersection of `left` and `right`.
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }

    /// Validates a value against this schema.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        let left = self.left.validate_to_value(value, path);
        let right = self.right.validate_to_value(value, path);
        match (left, right) {
            (Validation::Success(l), Validation::Success(r)) => merge(l, r, path),
            (Validation::Failure(e), Validation::Success(_))
            | (Validation::Success(_), Validation::Failure(e)) => Validation::Failure(e),
            (Validation::Failure(l), Validation::Failure(r)) => Validation::Failure(l.combine(r)),
        }
    }
}

fn merge(left: Value, right: Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => Validation::Success(Value::Object(merge_objects(l, r))),
        (l, r) if deep::equal(&l, &r) => Validation::Success(l),
        (l, r) => Validation::Failure(SchemaErrors::single(
            SchemaError::new(path.clone(), "intersection results could not be merged")
                .with_code("invalid_intersection")
                .with_expected(l.to_string())
                .with_got(r.to_string()),
        )),
    }
}

impl<A: SchemaLike, B: SchemaLike> SchemaLike for IntersectionSchema<A, B> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        let left = self.left.validate_missing(path);
        let right = self.right.validate_missing(path);
        match (left, right) {
            (Validation::Success(Some(l)), Validation::Success(Some(r))) => {
                merge(l, r, path).map(Some)
            }
            (Validation::Success(l), Validation::Success(r)) => Validation::Success(l.or(r)),
            (Validation::Failure(e), Validation::Success(_))
            | (Validation::Success(_), Validation::Failure(e)) => Validation::Failure(e),
            (Validation::Failure(l), Validation::Failure(r)) => Validation::Failure(l.combine(r)),
        }
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Intersection(&self.left, &self.right)
    }

    fn default_value(&self) -> Option<Value> {
        match (self.left.default_value(), self.right.default_value()) {
            (Some(Value::Object(l)), Some(Value::Object(r))) => {
                Some(Value::Object(merge_objects(l, r)))
            }
            (l, r) => l.or(r),
        }
    }
}

/// Merges two object maps, the right side winning on shared keys.
fn merge_objects(mut left: Map<String, Value>, right: Map<String, Value>) -> Map<String, Value> {
    left.extend(right);
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IntegerSchema, ObjectSchema, Schema, SchemaExt, StringSchema};
    use serde_json::json;

    fn circle_or_rect() -> UnionSchema {
        UnionSchema::new(vec![
            Box::new(
                ObjectSchema::new()
                    .field("kind", Schema::literal("circle"))
                    .field("radius", IntegerSchema::new().positive()),
            ) as Box<dyn ValueValidator>,
            Box::new(
                ObjectSchema::new()
                    .field("kind", Schema::literal("rect"))
                    .field("width", IntegerSchema::new().positive())
                    .field("height", IntegerSchema::new().positive()),
            ),
        ])
    }

    #[test]
    fn test_union_first_match_wins() {
        let schema = UnionSchema::new(vec![]).or(IntegerSchema::new()).or(Schema::any());
        let out = schema.validate(&json!(4), &JsonPath::root()).into_result().unwrap();
        assert_eq!(out, json!(4));
    }

    #[test]
    fn test_union_reports_closest_alternative() {
        let errors = circle_or_rect()
            .validate(&json!({"kind": "rect", "width": 3}), &JsonPath::root())
            .into_result()
            .unwrap_err();
        // circle fails on kind and radius; rect only misses height
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().path, JsonPath::from_field("height"));
    }

    #[test]
    fn test_empty_union_rejects() {
        let errors = UnionSchema::new(vec![])
            .validate(&json!(1), &JsonPath::root())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().code, "invalid_union");
    }

    #[test]
    fn test_union_missing_is_ok_if_any_alternative_allows_it() {
        let schema = UnionSchema::new(vec![
            Box::new(StringSchema::new()) as Box<dyn ValueValidator>,
            Box::new(IntegerSchema::new().optional()),
        ]);
        assert!(matches!(
            schema.validate_missing(&JsonPath::root()),
            Validation::Success(None)
        ));
    }

    #[test]
    fn test_intersection_merges_objects() {
        let schema = IntersectionSchema::new(
            ObjectSchema::new().field("name", StringSchema::new()),
            ObjectSchema::new().field("age", IntegerSchema::new()),
        );
        let out = schema
            .validate(&json!({"name": "Ada", "age": 36}), &JsonPath::root())
            .into_result()
            .unwrap();
        assert_eq!(out, json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_intersection_accumulates_both_sides() {
        let schema = IntersectionSchema::new(
            ObjectSchema::new().field("name", StringSchema::new()),
            ObjectSchema::new().field("age", IntegerSchema::new()),
        );
        let errors = schema
            .validate(&json!({}), &JsonPath::root())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_intersection_of_scalars_must_agree() {
        let schema = IntersectionSchema::new(
            IntegerSchema::new(),
            StringSchema::new().pipe(IntegerSchema::new().coerce()),
        );
        // Left rejects text, right rejects numbers
        assert!(schema.validate(&json!("1"), &JsonPath::root()).is_failure());

        let both = IntersectionSchema::new(IntegerSchema::new().min(0), IntegerSchema::new().max(9));
        assert!(both.validate(&json!(5), &JsonPath::root()).is_success());
        assert_eq!(
            both.validate(&json!(10), &JsonPath::root())
                .into_result()
                .unwrap_err()
                .first()
                .code,
            "max_value"
        );
    }

    #[test]
    fn test_merge_objects_right_wins() {
        let mut left = Map::new();
        left.insert("a".into(), json!(1));
        let mut right = Map::new();
        right.insert("a".into(), json!(2));
        assert_eq!(merge_objects(left, right).get("a"), Some(&json!(2)));
    }
}
