//! Wrapper schemas.
//!
//! Each wrapper changes how a value (or its absence) is judged but adds no
//! structure of its own, so every one of them reports [`Shape::Wrapper`] and
//! field navigation passes straight through to the wrapped schema.
//!
//! The [`SchemaExt`] trait puts the wrappers within reach of any schema:
//!
//! ```rust
//! use formwork::{JsonPath, Schema, SchemaExt, SchemaLike};
//! use serde_json::json;
//!
//! let nickname = Schema::string().min_len(2).optional();
//! assert!(nickname.validate_missing(&JsonPath::root()).is_success());
//!
//! let slug = Schema::string()
//!     .transform(|v| json!(v.as_str().map(str::to_lowercase)))
//!     .refine(|v| !v.as_str().unwrap_or_default().contains(' '), "no spaces");
//! let out = slug.validate_to_value(&json!("Hello"), &JsonPath::root());
//! assert_eq!(out.into_result().unwrap(), json!("hello"));
//! ```

use std::sync::OnceLock;

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{SchemaLike, Shape, ValueValidator};

/// Accepts absence; present values must match the inner schema.
pub struct OptionalSchema<S> {
    inner: S,
}

impl<S: SchemaLike> OptionalSchema<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: SchemaLike> SchemaLike for OptionalSchema<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner.validate_to_value(value, path)
    }

    fn validate_missing(&self, _path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        Validation::Success(None)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.inner)
    }
}

/// Accepts `null`; other values must match the inner schema.
pub struct NullableSchema<S> {
    inner: S,
}

impl<S: SchemaLike> NullableSchema<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: SchemaLike> SchemaLike for NullableSchema<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        if value.is_null() {
            Validation::Success(Value::Null)
        } else {
            self.inner.validate_to_value(value, path)
        }
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.inner.validate_missing(path)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.inner)
    }

    fn default_value(&self) -> Option<Value> {
        self.inner.default_value()
    }
}

/// Substitutes a declared value for absence.
///
/// The default is validated through the inner schema, so transforms and
/// coercions apply to it as to any other input.
pub struct DefaultSchema<S> {
    inner: S,
    default: Value,
}

impl<S: SchemaLike> DefaultSchema<S> {
    /// Wraps `inner` with `default`.
    pub fn new(inner: S, default: Value) -> Self {
        Self { inner, default }
    }
}

impl<S: SchemaLike> SchemaLike for DefaultSchema<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner.validate_to_value(value, path)
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.inner.validate_to_value(&self.default, path).map(Some)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.inner)
    }

    fn default_value(&self) -> Option<Value> {
        Some(self.default.clone())
    }
}

type TransformFn = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Maps the inner schema's validated output.
pub struct TransformSchema<S> {
    inner: S,
    transform: TransformFn,
}

impl<S: SchemaLike> TransformSchema<S> {
    /// Wraps `inner`, mapping its output through `transform`.
    pub fn new<F>(inner: S, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            inner,
            transform: Box::new(transform),
        }
    }
}

impl<S: SchemaLike> SchemaLike for TransformSchema<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner
            .validate_to_value(value, path)
            .map(|v| (self.transform)(v))
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.inner
            .validate_missing(path)
            .map(|v| v.map(|v| (self.transform)(v)))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.inner)
    }

    fn default_value(&self) -> Option<Value> {
        self.inner.default_value()
    }
}

type RefineFn = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Adds a predicate over the inner schema's validated output.
///
/// The predicate only runs once the inner schema has passed. A failing
/// predicate reports one issue with code `custom` at the current path.
pub struct RefineSchema<S> {
    inner: S,
    check: RefineFn,
    message: String,
}

impl<S: SchemaLike> RefineSchema<S> {
    /// Wraps `inner` with `check`, reporting `message` when it returns false.
    pub fn new<F>(inner: S, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            check: Box::new(check),
            message: message.into(),
        }
    }

    fn refine(&self, value: Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        if (self.check)(&value) {
            Validation::Success(value)
        } else {
            Validation::Failure(SchemaErrors::single(
                SchemaError::new(path.clone(), self.message.clone()).with_code("custom"),
            ))
        }
    }
}

impl<S: SchemaLike> SchemaLike for RefineSchema<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        match self.inner.validate_to_value(value, path) {
            Validation::Success(v) => self.refine(v, path),
            Validation::Failure(e) => Validation::Failure(e),
        }
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        match self.inner.validate_missing(path) {
            Validation::Success(Some(v)) => self.refine(v, path).map(Some),
            other => other,
        }
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.inner)
    }

    fn default_value(&self) -> Option<Value> {
        self.inner.default_value()
    }
}

type LazyInit = Box<dyn Fn() -> Box<dyn ValueValidator> + Send + Sync>;

/// Builds its inner schema on first use.
///
/// This is how recursive schemas are expressed: the closure can construct a
/// schema that contains another `LazySchema` built by the same function.
///
/// ```rust
/// use formwork::{JsonPath, Schema, SchemaExt, SchemaLike};
/// use serde_json::json;
///
/// fn category() -> formwork::ObjectSchema {
///     Schema::object()
///         .field("name", Schema::string())
///         .field("children", Schema::array(Schema::lazy(|| category())).optional())
/// }
///
/// let tree = json!({"name": "root", "children": [{"name": "leaf"}]});
/// assert!(category().validate(&tree, &JsonPath::root()).is_success());
/// ```
pub struct LazySchema {
    init: LazyInit,
    cell: OnceLock<Box<dyn ValueValidator>>,
}

impl LazySchema {
    /// Creates a lazy schema from a constructor.
    pub fn new<F, S>(init: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: SchemaLike + 'static,
    {
        Self {
            init: Box::new(move || Box::new(init()) as Box<dyn ValueValidator>),
            cell: OnceLock::new(),
        }
    }

    fn inner(&self) -> &dyn ValueValidator {
        self.cell.get_or_init(|| (self.init)()).as_ref()
    }
}

impl SchemaLike for LazySchema {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner().validate_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.inner().validate_value(value, path)
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.inner().validate_absent(path)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(self.inner())
    }

    fn default_value(&self) -> Option<Value> {
        self.inner().declared_default()
    }
}

/// Feeds the output of one schema into another.
///
/// Navigation follows the output side, which is the shape the validated
/// value has.
pub struct PipelineSchema<A, B> {
    first: A,
    second: B,
}

impl<A: SchemaLike, B: SchemaLike> PipelineSchema<A, B> {
    /// Validates with `first`, then validates its output with `second`.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: SchemaLike, B: SchemaLike> SchemaLike for PipelineSchema<A, B> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        match self.first.validate_to_value(value, path) {
            Validation::Success(v) => self.second.validate_to_value(&v, path),
            Validation::Failure(e) => Validation::Failure(e),
        }
    }

    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        match self.first.validate_missing(path) {
            Validation::Success(Some(v)) => self.second.validate_to_value(&v, path).map(Some),
            other => other,
        }
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Wrapper(&self.second)
    }

    fn default_value(&self) -> Option<Value> {
        self.first.default_value()
    }
}

/// Wrapper constructors available on every schema.
pub trait SchemaExt: SchemaLike + Sized {
    /// Lets the value be absent.
    fn optional(self) -> OptionalSchema<Self> {
        OptionalSchema::new(self)
    }

    /// Lets the value be `null`.
    fn nullable(self) -> NullableSchema<Self> {
        NullableSchema::new(self)
    }

    /// Lets the value be absent or `null`.
    fn nullish(self) -> OptionalSchema<NullableSchema<Self>> {
        OptionalSchema::new(NullableSchema::new(self))
    }

    /// Substitutes `default` for absence.
    fn with_default(self, default: Value) -> DefaultSchema<Self> {
        DefaultSchema::new(self, default)
    }

    /// Maps the validated output.
    fn transform<F>(self, transform: F) -> TransformSchema<Self>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        TransformSchema::new(self, transform)
    }

    /// Adds a predicate over the validated output.
    fn refine<F>(self, check: F, message: impl Into<String>) -> RefineSchema<Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        RefineSchema::new(self, check, message)
    }

    /// Validates the output again with `next`.
    fn pipe<B: SchemaLike>(self, next: B) -> PipelineSchema<Self, B> {
        PipelineSchema::new(self, next)
    }
}

impl<S: SchemaLike> SchemaExt for S {}
