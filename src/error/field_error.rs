//! Contract violations.
//!
//! These errors mean the calling code addressed the draft or the schema in a
//! way the schema does not allow. They are never stored as form state.

use thiserror::Error;

use crate::path::JsonPath;

/// A structural failure of [`deep::set`](crate::deep::set).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeepPathError {
    /// Writing requires at least one segment.
    #[error("cannot set a value at an empty path")]
    EmptyPath,

    /// An existing scalar sits where a container is needed.
    #[error("cannot traverse into {found} at \"{path}\"")]
    TraversePrimitive {
        /// Path of the scalar.
        path: JsonPath,
        /// JSON type name of the scalar.
        found: &'static str,
    },

    /// An index lies too far past the end of its array to pad.
    #[error("index {index} at \"{path}\" is out of range for an array of length {len}")]
    IndexOutOfRange {
        /// Path of the array.
        path: JsonPath,
        /// The requested index.
        index: usize,
        /// Length of the array.
        len: usize,
    },

    /// The segment kind does not match the container already present.
    #[error("segment at \"{path}\" addresses an {expected} but found an {found}")]
    KindMismatch {
        /// Path of the container.
        path: JsonPath,
        /// Container kind the segment addresses.
        expected: &'static str,
        /// Container kind actually present.
        found: &'static str,
    },
}

/// A field-chain navigation or binding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The accessor names nothing the schema declares at this point.
    #[error("no such field '{key}' at \"{path}\": expected {expected}, found {found}")]
    NoSuchField {
        /// Path of the handle the accessor was applied to.
        path: JsonPath,
        /// The offending accessor.
        key: String,
        /// What the accessor would need.
        expected: String,
        /// Kind of the schema at `path`.
        found: String,
    },

    /// Two union or intersection alternatives declare the same key with
    /// different structural kinds.
    #[error("ambiguous shape at \"{path}\": key '{key}' is {first} in one alternative and {second} in another")]
    AmbiguousShape {
        /// Path of the union or intersection.
        path: JsonPath,
        /// Conflicting key.
        key: String,
        /// Kind declared first.
        first: String,
        /// Kind declared later.
        second: String,
    },

    /// An element binding was used on a container field.
    #[error("field \"{name}\" is {found} and cannot take a value from an input element")]
    NotALeaf {
        /// Field name.
        name: String,
        /// Kind of the schema at the field.
        found: String,
    },

    /// A draft write failed structurally.
    #[error(transparent)]
    Path(#[from] DeepPathError),
}
