//! Traits for schema polymorphism.
//!
//! [`SchemaLike`] is implemented by every concrete schema. [`ValueValidator`] is
//! its object-safe, type-erased counterpart, used wherever heterogeneous
//! schemas are stored side by side (object children, union alternatives) and
//! wherever the form layer walks a schema without knowing its type.
//!
//! Besides validation, every schema describes its structure through
//! [`Shape`], a closed tagged union the field chain navigates.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

/// The scalar kinds a leaf schema can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Text.
    String,
    /// Any finite number.
    Number,
    /// Whole numbers.
    Integer,
    /// `true` / `false`.
    Boolean,
    /// A point in time.
    Date,
    /// One of a fixed set of values.
    Enum,
    /// Exactly one value.
    Literal,
    /// Anything.
    Any,
}

impl LeafKind {
    /// Returns true if the leaf accepts free text as-is.
    ///
    /// Empty text written to any other leaf is treated as absence.
    pub fn accepts_text(self) -> bool {
        matches!(self, LeafKind::String)
    }

    /// Returns the lowercase name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            LeafKind::String => "string",
            LeafKind::Number => "number",
            LeafKind::Integer => "integer",
            LeafKind::Boolean => "boolean",
            LeafKind::Date => "date",
            LeafKind::Enum => "enum",
            LeafKind::Literal => "literal",
            LeafKind::Any => "any",
        }
    }
}

impl Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structural description of a schema node.
///
/// Wrapper-like schemas (optional, nullable, default, transform, refine, lazy,
/// pipeline) report [`Shape::Wrapper`] so navigation can see through them.
pub enum Shape<'a> {
    /// A scalar with no navigable children.
    Leaf(LeafKind),
    /// Named children, in declaration order.
    Object(Vec<(&'a str, &'a dyn ValueValidator)>),
    /// A sequence of a single element schema.
    Array(&'a dyn ValueValidator),
    /// A transparent layer around an inner schema.
    Wrapper(&'a dyn ValueValidator),
    /// Alternatives, any one of which may match.
    Union(Vec<&'a dyn ValueValidator>),
    /// Two schemas that must both match.
    Intersection(&'a dyn ValueValidator, &'a dyn ValueValidator),
}

impl fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Leaf(kind) => f.debug_tuple("Leaf").field(kind).finish(),
            Shape::Object(children) => f
                .debug_tuple("Object")
                .field(&children.iter().map(|(name, _)| *name).collect::<Vec<_>>())
                .finish(),
            Shape::Array(_) => f.write_str("Array(..)"),
            Shape::Wrapper(_) => f.write_str("Wrapper(..)"),
            Shape::Union(alternatives) => write!(f, "Union({} alternatives)", alternatives.len()),
            Shape::Intersection(..) => f.write_str("Intersection(..)"),
        }
    }
}

/// A trait for schema types that can validate JSON values.
///
/// `SchemaLike` enables schema polymorphism, allowing different schema types
/// to be composed together for validating nested structures. Any type that
/// implements this trait can be used as a field schema in an `ObjectSchema`.
///
/// The `Send + Sync` bounds allow schemas to be shared with a form that is
/// itself shared across threads.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, LeafKind, Schema, SchemaLike, Shape};
/// use serde_json::json;
///
/// let object = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::integer().positive());
///
/// assert!(object.validate(&json!({"name": "Ada", "age": 36}), &JsonPath::root()).is_success());
/// assert!(matches!(Schema::string().shape(), Shape::Leaf(LeafKind::String)));
/// ```
pub trait SchemaLike: Send + Sync {
    /// The output type produced by successful validation.
    type Output;

    /// Validates a value against this schema.
    ///
    /// Returns `Validation::Success` with the validated value on success,
    /// or `Validation::Failure` with accumulated errors on failure.
    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors>;

    /// Validates a value and returns the result as a `serde_json::Value`.
    ///
    /// This method allows schema types with different output types to be
    /// used uniformly in object schemas where all fields are stored as `Value`.
    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors>;

    /// Judges an absent value.
    ///
    /// Required by default. Optional schemas succeed with `None`; defaulted
    /// schemas succeed with their validated default.
    fn validate_missing(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        Validation::Failure(SchemaErrors::single(SchemaError::required(path)))
    }

    /// Describes the structure of this schema.
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::Any)
    }

    /// The value this schema declares for an absent input, if any.
    fn default_value(&self) -> Option<Value> {
        None
    }
}

/// A type-erased trait for schemas that validate to JSON values.
///
/// Any type that implements `SchemaLike` automatically implements
/// `ValueValidator`.
///
/// # Example
///
/// ```rust
/// use formwork::{Schema, ValueValidator};
///
/// let validators: Vec<Box<dyn ValueValidator>> = vec![
///     Box::new(Schema::string().min_len(1)),
///     Box::new(Schema::integer().positive()),
/// ];
/// assert_eq!(validators.len(), 2);
/// ```
pub trait ValueValidator: Send + Sync {
    /// Validates a value and returns the result as a `serde_json::Value`.
    fn validate_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors>;

    /// Judges an absent value. See [`SchemaLike::validate_missing`].
    fn validate_absent(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors>;

    /// Describes the structure of this schema. See [`SchemaLike::shape`].
    fn describe_shape(&self) -> Shape<'_>;

    /// The value this schema declares for an absent input, if any.
    fn declared_default(&self) -> Option<Value>;

    /// Validates a possibly absent value.
    fn validate_option(
        &self,
        value: Option<&Value>,
        path: &JsonPath,
    ) -> Validation<Option<Value>, SchemaErrors> {
        match value {
            Some(value) => self.validate_value(value, path).map(Some),
            None => self.validate_absent(path),
        }
    }
}

/// Blanket implementation of `ValueValidator` for all `SchemaLike` types.
impl<S: SchemaLike> ValueValidator for S {
    fn validate_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_absent(&self, path: &JsonPath) -> Validation<Option<Value>, SchemaErrors> {
        self.validate_missing(path)
    }

    fn describe_shape(&self) -> Shape<'_> {
        self.shape()
    }

    fn declared_default(&self) -> Option<Value> {
        self.default_value()
    }
}

/// Builds the invalid-type issue every schema reports for a wrong JSON type.
pub(crate) fn type_error(
    path: &JsonPath,
    custom: Option<&String>,
    default_message: &str,
    expected: &str,
    value: &Value,
) -> SchemaErrors {
    let message = custom
        .cloned()
        .unwrap_or_else(|| default_message.to_string());
    SchemaErrors::single(
        SchemaError::new(path.clone(), message)
            .with_code("invalid_type")
            .with_got(crate::deep::type_name(value))
            .with_expected(expected.to_string()),
    )
}

/// Turns a list of collected issues into a validation result.
pub(crate) fn finish<T>(value: T, errors: Vec<SchemaError>) -> Validation<T, SchemaErrors> {
    match SchemaErrors::try_from_vec(errors) {
        None => Validation::Success(value),
        Some(errors) => Validation::Failure(errors),
    }
}
