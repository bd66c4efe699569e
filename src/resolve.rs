//! Structural views of schemas for navigation.
//!
//! Validation sees every schema layer; navigation only cares about structure.
//! [`unwrap`] strips wrapper layers, and [`object_shape`] merges the object
//! children of union and intersection alternatives into one addressable
//! view.
//!
//! The merged view is an approximation used to address fields, never to
//! validate them. When two alternatives declare the same key the later one
//! wins, provided both agree on whether the key is a leaf, an object or an
//! array; a disagreement is reported as [`FieldError::AmbiguousShape`].

use std::fmt::{self, Display};

use indexmap::IndexMap;

use crate::error::FieldError;
use crate::path::JsonPath;
use crate::schema::{LeafKind, Shape, ValueValidator};

/// The structural kind of an unwrapped schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// A scalar of the given kind.
    Leaf(LeafKind),
    /// Named children.
    Object,
    /// A sequence.
    Array,
    /// Alternatives.
    Union,
    /// Two schemas combined.
    Intersection,
}

impl Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Leaf(kind) => Display::fmt(kind, f),
            SchemaKind::Object => f.write_str("object"),
            SchemaKind::Array => f.write_str("array"),
            SchemaKind::Union => f.write_str("union"),
            SchemaKind::Intersection => f.write_str("intersection"),
        }
    }
}

/// The named children of an object or merged shape.
pub type ObjectChildren<'a> = IndexMap<&'a str, &'a dyn ValueValidator>;

/// Strips wrapper layers until a structural node is reached.
pub fn unwrap(schema: &dyn ValueValidator) -> &dyn ValueValidator {
    let mut current = schema;
    while let Shape::Wrapper(inner) = current.describe_shape() {
        current = inner;
    }
    current
}

/// Returns the structural kind of `schema` once unwrapped.
pub fn kind_of(schema: &dyn ValueValidator) -> SchemaKind {
    match unwrap(schema).describe_shape() {
        Shape::Leaf(kind) => SchemaKind::Leaf(kind),
        Shape::Object(_) => SchemaKind::Object,
        Shape::Array(_) => SchemaKind::Array,
        Shape::Union(_) => SchemaKind::Union,
        Shape::Intersection(..) => SchemaKind::Intersection,
        // unwrap never stops at a wrapper
        Shape::Wrapper(_) => SchemaKind::Leaf(LeafKind::Any),
    }
}

/// Returns the leaf kind of `schema`, or `None` if it has navigable structure.
///
/// A union of leaves has the kind its alternatives share, or
/// [`LeafKind::Any`] when they differ.
pub fn leaf_kind(schema: &dyn ValueValidator) -> Option<LeafKind> {
    match unwrap(schema).describe_shape() {
        Shape::Leaf(kind) => Some(kind),
        Shape::Union(alternatives) => {
            let mut kinds = alternatives.into_iter().map(leaf_kind);
            let first = kinds.next()??;
            let mut shared = first;
            for kind in kinds {
                let kind = kind?;
                if kind != first {
                    shared = LeafKind::Any;
                }
            }
            Some(shared)
        }
        _ => None,
    }
}

/// Returns the element schema if `schema` is an array once unwrapped.
pub fn array_element(schema: &dyn ValueValidator) -> Option<&dyn ValueValidator> {
    match unwrap(schema).describe_shape() {
        Shape::Array(element) => Some(element),
        _ => None,
    }
}

/// Returns the addressable children of `schema`.
///
/// Objects yield their declared children. Unions and intersections yield the
/// merged children of their object alternatives. Anything else yields `None`.
///
/// # Errors
///
/// [`FieldError::AmbiguousShape`] when two alternatives declare the same key
/// with different structural kinds. `path` is reported as the location.
pub fn object_shape<'a>(
    schema: &'a dyn ValueValidator,
    path: &JsonPath,
) -> Result<Option<ObjectChildren<'a>>, FieldError> {
    match unwrap(schema).describe_shape() {
        Shape::Object(children) => Ok(Some(children.into_iter().collect())),
        Shape::Union(alternatives) => merge_alternatives(alternatives, path),
        Shape::Intersection(left, right) => merge_alternatives(vec![left, right], path),
        _ => Ok(None),
    }
}

fn merge_alternatives<'a>(
    alternatives: Vec<&'a dyn ValueValidator>,
    path: &JsonPath,
) -> Result<Option<ObjectChildren<'a>>, FieldError> {
    let mut merged: Option<ObjectChildren<'a>> = None;
    for alternative in alternatives {
        let Some(children) = object_shape(alternative, path)? else {
            continue;
        };
        let target = merged.get_or_insert_with(IndexMap::new);
        for (key, child) in children {
            if let Some(existing) = target.get(key) {
                let first = navigation_class(*existing);
                let second = navigation_class(child);
                if first != second {
                    return Err(FieldError::AmbiguousShape {
                        path: path.clone(),
                        key: key.to_string(),
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
            target.insert(key, child);
        }
    }
    Ok(merged)
}

/// How navigation treats a node: as a leaf, an object or an array.
///
/// Intersections navigate like objects; a union navigates like its
/// alternatives when they all agree.
fn navigation_class(schema: &dyn ValueValidator) -> &'static str {
    match unwrap(schema).describe_shape() {
        Shape::Leaf(_) => "leaf",
        Shape::Object(_) | Shape::Intersection(..) => "object",
        Shape::Array(_) => "array",
        Shape::Union(alternatives) => {
            let mut classes = alternatives.into_iter().map(navigation_class);
            match classes.next() {
                Some(first) if classes.all(|c| c == first) => first,
                _ => "union",
            }
        }
        Shape::Wrapper(_) => "leaf",
    }
}
