//! Schema definitions for validation.
//!
//! This module provides schema types for validating form drafts. Each schema
//! type validates values and accumulates all validation errors rather than
//! short-circuiting on the first failure, and describes its structure through
//! [`Shape`] so the field chain can navigate it.
//!
//! # Example
//!
//! ```rust
//! use formwork::{JsonPath, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::string().min_len(1).max_len(100);
//!
//! let result = schema.validate(&json!("hello"), &JsonPath::root());
//! assert!(result.is_success());
//! ```

mod array;
mod boolean;
mod choice;
mod combinators;
mod date;
pub mod defaults;
mod numeric;
mod object;
mod string;
mod traits;
mod wrappers;

use serde_json::Value;

pub use array::ArraySchema;
pub use boolean::BooleanSchema;
pub use choice::{AnySchema, EnumSchema, LiteralSchema};
pub use combinators::{IntersectionSchema, UnionSchema};
pub use date::DateSchema;
pub use numeric::{IntegerSchema, NumberSchema};
pub use object::{AdditionalPropertiesSetting, ObjectSchema};
pub use string::StringSchema;
pub use traits::{LeafKind, SchemaLike, Shape, ValueValidator};
pub use wrappers::{
    DefaultSchema, LazySchema, NullableSchema, OptionalSchema, PipelineSchema, RefineSchema,
    SchemaExt, TransformSchema,
};

/// Entry point for creating validation schemas.
///
/// `Schema` provides factory methods for creating different schema types.
/// Each schema type supports its constraints through a builder pattern.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, Schema, SchemaExt};
/// use serde_json::json;
///
/// let signup = Schema::object()
///     .field("name", Schema::string().min_len(1))
///     .field("age", Schema::number().min(13.0).coerce())
///     .field("color", Schema::enumeration(["red", "green"]).optional())
///     .field("flowers", Schema::array(Schema::string().min_len(1)));
///
/// let draft = json!({"name": "john", "age": "18", "flowers": ["rose"]});
/// assert!(signup.validate(&draft, &JsonPath::root()).is_success());
/// ```
pub struct Schema;

impl Schema {
    /// Creates a new string schema.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// Creates a new integer schema.
    ///
    /// Float values are rejected:
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// assert!(Schema::integer().validate(&json!(1.5), &JsonPath::root()).is_failure());
    /// ```
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    /// Creates a new number schema.
    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// Creates a new boolean schema.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// Creates a new date schema.
    pub fn date() -> DateSchema {
        DateSchema::new()
    }

    /// Creates an enumeration of fixed values.
    pub fn enumeration<I, V>(options: I) -> EnumSchema
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        EnumSchema::new(options)
    }

    /// Creates a schema accepting exactly `value`.
    pub fn literal(value: impl Into<Value>) -> LiteralSchema {
        LiteralSchema::new(value)
    }

    /// Creates a schema accepting any present value.
    pub fn any() -> AnySchema {
        AnySchema
    }

    /// Creates a new object schema.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates an array schema whose items match `item_schema`.
    pub fn array<S: SchemaLike>(item_schema: S) -> ArraySchema<S> {
        ArraySchema::new(item_schema)
    }

    /// Creates a union of `alternatives`.
    pub fn union(alternatives: Vec<Box<dyn ValueValidator>>) -> UnionSchema {
        UnionSchema::new(alternatives)
    }

    /// Creates the intersection of two schemas.
    pub fn intersection<A: SchemaLike, B: SchemaLike>(left: A, right: B) -> IntersectionSchema<A, B> {
        IntersectionSchema::new(left, right)
    }

    /// Lets `inner` be absent.
    pub fn optional<S: SchemaLike>(inner: S) -> OptionalSchema<S> {
        OptionalSchema::new(inner)
    }

    /// Creates a schema built on first use, for recursive structures.
    pub fn lazy<F, S>(init: F) -> LazySchema
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: SchemaLike + 'static,
    {
        LazySchema::new(init)
    }
}
