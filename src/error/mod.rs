//! Error types.
//!
//! Two disjoint families live here. [`SchemaError`] and [`SchemaErrors`] are
//! validation issues: expected, path-tagged, stored as form state and shown to
//! the user. [`FieldError`] and [`DeepPathError`] are contract violations: the
//! calling code addressed the draft or the schema in a way the schema does not
//! allow, and they are returned as `Err` to the caller.

mod field_error;
mod schema_error;
mod summary;

pub use field_error::{DeepPathError, FieldError};
pub use schema_error::{FlattenedErrors, SchemaError, SchemaErrors};
pub use summary::{summarize, IssueMap, SummaryOptions};
