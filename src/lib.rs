//! # Formwork
//!
//! Schema-driven form state. A [`Form`] holds a draft value, navigates it
//! through the structure its schema declares, binds draft locations to host
//! input elements and validates on submit, accumulating every issue rather
//! than stopping at the first.
//!
//! ## Overview
//!
//! The schema is the single source of truth. It validates the draft through
//! stillwater's `Validation` type, and it describes its own structure so that
//! field handles can only address locations the schema declares. Addressing
//! anything else is a [`FieldError`], returned to the caller. Validation
//! issues, by contrast, are data: stored on the form and read back per field.
//!
//! ## Core Types
//!
//! - [`Schema`]: Entry point for creating validation schemas
//! - [`Form`]: Owns the draft, the baseline and the last validation issues
//! - [`Field`]: A handle to one location in the draft (e.g. `users.0.email`)
//! - [`Registration`]: Binds a location to host [`InputElement`]s
//! - [`JsonPath`]: Typed paths into nested values
//! - [`SchemaError`] / [`SchemaErrors`]: Path-tagged validation issues
//!
//! ## Example
//!
//! ```rust
//! use formwork::{ChangeEvent, Form, Schema};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let form = Form::new(
//!     Schema::object()
//!         .field("name", Schema::string().min_len(1))
//!         .field("age", Schema::number().min(13.0).coerce()),
//! );
//!
//! let name = form.fields().field("name").unwrap();
//! name.set_value(json!("john")).unwrap();
//!
//! let age = form.fields().field("age").unwrap().register();
//! age.on_change(&ChangeEvent::text("18")).unwrap();
//!
//! let parsed = block_on(form.validate());
//! assert_eq!(parsed, Some(json!({"name": "john", "age": 18})));
//! assert!(form.errors().is_none());
//! ```

pub mod deep;
pub mod effect;
pub mod error;
pub mod field;
pub mod form;
pub mod path;
pub mod resolve;
pub mod schema;

pub use effect::{async_validator, AsyncValidator};
pub use error::{
    summarize, DeepPathError, FieldError, FlattenedErrors, SchemaError, SchemaErrors,
    SummaryOptions,
};
pub use field::{
    ChangeEvent, Controlled, ElementKind, Field, InputElement, RegisterOptions, Registration,
};
pub use form::{Form, FormBuilder, RevalidateMode, Spawner, SubmitEvent};
pub use path::{JsonPath, PathSegment};
pub use resolve::SchemaKind;
pub use schema::{
    ArraySchema, LeafKind, ObjectSchema, Schema, SchemaExt, SchemaLike, Shape, StringSchema,
    ValueValidator,
};
