//! Validation issue types.
//!
//! [`SchemaError`] is one path-tagged issue produced by a schema. [`SchemaErrors`]
//! is the non-empty set a failed validation pass produces; a form stores the
//! latest one wholesale and hands slices of it to each field.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single validation issue.
///
/// - **path**: where in the draft the issue was found
/// - **message**: human-readable description
/// - **code**: machine-readable code (`required`, `min_length`, ...)
/// - **got** / **expected**: optional detail for display
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, SchemaError};
///
/// let error = SchemaError::new(JsonPath::from_field("age"), "must be at least 13")
///     .with_code("min_value")
///     .with_got("9");
///
/// assert_eq!(error.code, "min_value");
/// assert_eq!(error.to_string(), "age: must be at least 13 (got: 9)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable error code (e.g., `min_length`).
    pub code: String,
}

impl SchemaError {
    /// Creates a new issue with the given path and message.
    ///
    /// The code defaults to `"validation_error"`.
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    /// The issue reported for an absent required value.
    pub fn required(path: &JsonPath) -> Self {
        let message = match path.last() {
            Some(segment) => format!("required field '{}' is missing", segment.key()),
            None => "value is required".to_string(),
        };
        SchemaError::new(path.clone(), message)
            .with_code("required")
            .with_expected("value")
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
};

/// A non-empty collection of validation issues.
///
/// Wraps a `NonEmptyVec<SchemaError>` so a failed `Validation` always carries
/// at least one issue. Collections from independent checks are combined with
/// [`Semigroup::combine`].
///
/// ```rust
/// use formwork::{JsonPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let errors = SchemaErrors::single(SchemaError::new(JsonPath::from_field("name"), "required"))
///     .combine(SchemaErrors::single(SchemaError::new(JsonPath::from_field("age"), "too small")));
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.under_path(&JsonPath::from_field("age")).len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single error.
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `SchemaErrors` from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<SchemaError>) -> Self {
        Self(errors)
    }

    /// Creates a `SchemaErrors` from a vec, or `None` when it is empty.
    pub fn try_from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self::from_vec(errors))
        }
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    /// Returns all errors at exactly the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors whose path starts with `prefix` (raw-key comparison).
    ///
    /// At a container path this is every issue of every descendant.
    pub fn under_path(&self, prefix: &JsonPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.path.starts_with(prefix)).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<SchemaError>`.
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }

    /// Groups issues by their top-level field.
    ///
    /// Issues at the root path are form-level issues.
    pub fn flatten(&self) -> FlattenedErrors {
        let mut flattened = FlattenedErrors::default();
        for error in self.iter() {
            match error.path.first() {
                Some(segment) => flattened
                    .field_errors
                    .entry(segment.key().into_owned())
                    .or_default()
                    .push(error.clone()),
                None => flattened.form_errors.push(error.clone()),
            }
        }
        flattened
    }

    /// Creates a `SchemaErrors` from a `Vec<SchemaError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty. Callers only use it after checking
    /// that at least one issue was collected.
    pub fn from_vec(errors: Vec<SchemaError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("SchemaErrors requires at least one error"))
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

/// Issues grouped for display next to individual top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedErrors {
    /// Issues whose path is the root.
    pub form_errors: Vec<SchemaError>,
    /// Issues keyed by the first key of their path, in first-seen order.
    pub field_errors: IndexMap<String, Vec<SchemaError>>,
}

impl FlattenedErrors {
    /// Issues recorded under the top-level field `name`.
    pub fn field(&self, name: &str) -> &[SchemaError] {
        self.field_errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaErrors {
        SchemaErrors::from_vec(vec![
            SchemaError::new(JsonPath::root(), "passwords differ").with_code("custom"),
            SchemaError::new(JsonPath::from_field("name"), "too short").with_code("min_length"),
            SchemaError::new(JsonPath::from_field("address").push_field("city"), "required")
                .with_code("required"),
            SchemaError::new(JsonPath::from_field("address").push_field("zip"), "required")
                .with_code("required"),
        ])
    }

    #[test]
    fn test_required_message_names_last_key() {
        let error = SchemaError::required(&JsonPath::from_field("user").push_field("email"));
        assert_eq!(error.code, "required");
        assert_eq!(error.message, "required field 'email' is missing");

        let root = SchemaError::required(&JsonPath::root());
        assert_eq!(root.message, "value is required");
    }

    #[test]
    fn test_display_root_and_detail() {
        let error = SchemaError::new(JsonPath::root(), "value is null");
        assert_eq!(error.to_string(), "(root): value is null");

        let error = SchemaError::new(JsonPath::from_field("url"), "invalid url")
            .with_expected("url")
            .with_got("nope");
        assert_eq!(error.to_string(), "url: invalid url (expected: url) (got: nope)");
    }

    #[test]
    fn test_under_path_aggregates_descendants() {
        let errors = sample();
        assert_eq!(errors.under_path(&JsonPath::from_field("address")).len(), 2);
        assert_eq!(errors.under_path(&JsonPath::from_field("name")).len(), 1);
        assert_eq!(errors.under_path(&JsonPath::root()).len(), 4);
        assert!(errors.under_path(&JsonPath::from_field("missing")).is_empty());
    }

    #[test]
    fn test_under_path_matches_index_by_key() {
        let errors = SchemaErrors::single(SchemaError::new(
            JsonPath::from_field("flowers").push_index(1),
            "too short",
        ));
        let by_name = JsonPath::from_field("flowers").push_field("1");
        assert_eq!(errors.under_path(&by_name).len(), 1);
    }

    #[test]
    fn test_flatten_groups_by_top_level_field() {
        let flattened = sample().flatten();
        assert_eq!(flattened.form_errors.len(), 1);
        assert_eq!(flattened.field("address").len(), 2);
        assert_eq!(flattened.field("name").len(), 1);
        assert!(flattened.field("age").is_empty());
        let keys: Vec<_> = flattened.field_errors.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "address"]);
    }

    #[test]
    fn test_try_from_vec_rejects_empty() {
        assert!(SchemaErrors::try_from_vec(Vec::new()).is_none());
        let one = SchemaErrors::try_from_vec(vec![SchemaError::new(JsonPath::root(), "x")]);
        assert_eq!(one.map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_combine_preserves_order() {
        let e1 = SchemaErrors::single(SchemaError::new(JsonPath::root(), "1"));
        let e2 = SchemaErrors::single(SchemaError::new(JsonPath::root(), "2"));
        let e3 = SchemaErrors::single(SchemaError::new(JsonPath::root(), "3"));

        let messages: Vec<_> = e1
            .combine(e2.combine(e3))
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_with_code_filters() {
        let errors = sample();
        assert_eq!(errors.with_code("required").len(), 2);
        assert_eq!(errors.with_code("custom").len(), 1);
    }
}
