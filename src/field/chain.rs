//! Field handles.
//!
//! A [`Field`] pairs a schema node with the path it sits at and the form it
//! reads from. Navigation steps are decided by the unwrapped schema: arrays
//! take indices, objects (and merged union or intersection shapes) take their
//! declared keys, and anything else is a [`FieldError::NoSuchField`].
//! Terminal operations are methods, so they are available at every depth and
//! never collide with declared field names.

use std::fmt;

use serde_json::Value;

use crate::error::{summarize, FieldError, SchemaError, SummaryOptions};
use crate::form::Form;
use crate::path::{JsonPath, PathSegment};
use crate::resolve::{self, SchemaKind};
use crate::schema::ValueValidator;

use super::controlled::Controlled;
use super::register::{RegisterOptions, Registration};

/// A handle to one location in a form's draft.
///
/// Handles are cheap to create and borrow the form; navigate from
/// [`Form::fields`].
///
/// ```rust
/// use formwork::{Form, Schema};
/// use serde_json::json;
///
/// let form = Form::new(
///     Schema::object()
///         .field("name", Schema::string().min_len(1))
///         .field("address", Schema::object().field("city", Schema::string())),
/// );
///
/// let city = form.fields().at("address.city").unwrap();
/// assert_eq!(city.name(), "address.city");
///
/// city.set_value(json!("Lisbon")).unwrap();
/// assert_eq!(form.draft(), json!({"address": {"city": "Lisbon"}}));
///
/// assert!(form.fields().child("nickname").is_err());
/// ```
#[derive(Clone)]
pub struct Field<'f> {
    form: &'f Form,
    schema: &'f dyn ValueValidator,
    path: JsonPath,
}

impl<'f> Field<'f> {
    pub(crate) fn root(form: &'f Form) -> Self {
        Self {
            form,
            schema: form.schema(),
            path: JsonPath::root(),
        }
    }

    fn descend(&self, schema: &'f dyn ValueValidator, segment: PathSegment) -> Self {
        Self {
            form: self.form,
            schema,
            path: self.path.push(segment),
        }
    }

    /// Steps into `key`.
    ///
    /// At an array, `key` must be a decimal index. At an object, a union or an
    /// intersection, it must be a declared key.
    ///
    /// # Errors
    ///
    /// [`FieldError::NoSuchField`] if the schema declares nothing under `key`,
    /// [`FieldError::AmbiguousShape`] if merged alternatives disagree on it.
    pub fn child(&self, key: &str) -> Result<Field<'f>, FieldError> {
        if let Some(element) = resolve::array_element(self.schema) {
            return match parse_index(key) {
                Some(index) => Ok(self.descend(element, PathSegment::Index(index))),
                None => Err(self.no_such_field(key, "an array index".to_string())),
            };
        }
        self.field(key)
    }

    /// Steps into the declared key `name`.
    ///
    /// # Errors
    ///
    /// As for [`child`](Self::child); arrays never have named keys.
    pub fn field(&self, name: &str) -> Result<Field<'f>, FieldError> {
        match resolve::object_shape(self.schema, &self.path)? {
            Some(children) => match children.get(name) {
                Some(child) => Ok(self.descend(*child, PathSegment::field(name))),
                None => {
                    let keys: Vec<&str> = children.keys().copied().collect();
                    let expected = if keys.is_empty() {
                        "no declared fields".to_string()
                    } else {
                        format!("one of: {}", keys.join(", "))
                    };
                    Err(self.no_such_field(name, expected))
                }
            },
            None => Err(self.no_such_field(name, "an object or array".to_string())),
        }
    }

    /// Steps into item `index` of an array.
    ///
    /// # Errors
    ///
    /// [`FieldError::NoSuchField`] unless the schema here is an array.
    pub fn index(&self, index: usize) -> Result<Field<'f>, FieldError> {
        match resolve::array_element(self.schema) {
            Some(element) => Ok(self.descend(element, PathSegment::Index(index))),
            None => Err(self.no_such_field(&index.to_string(), "an array".to_string())),
        }
    }

    /// Steps through a dotted path such as `"flowers.0"` or `"link.url"`.
    ///
    /// # Errors
    ///
    /// The first failing step's error.
    pub fn at(&self, dotted: &str) -> Result<Field<'f>, FieldError> {
        dotted
            .split('.')
            .filter(|key| !key.is_empty())
            .try_fold(self.clone(), |field, key| field.child(key))
    }

    fn no_such_field(&self, key: &str, expected: String) -> FieldError {
        FieldError::NoSuchField {
            path: self.path.clone(),
            key: key.to_string(),
            expected,
            found: self.kind().to_string(),
        }
    }

    /// The dotted field name, e.g. `users.0.email`.
    pub fn name(&self) -> String {
        self.path.name()
    }

    /// The typed path of this handle.
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// The schema node at this handle.
    pub fn schema(&self) -> &'f dyn ValueValidator {
        self.schema
    }

    /// The structural kind of the schema, wrappers stripped.
    pub fn kind(&self) -> SchemaKind {
        resolve::kind_of(self.schema)
    }

    /// The form this handle reads from.
    pub fn form(&self) -> &'f Form {
        self.form
    }

    /// The draft value here, `None` when absent.
    pub fn value(&self) -> Option<Value> {
        self.form.value_at(&self.path)
    }

    /// Replaces the draft value here. `None` removes it.
    ///
    /// # Errors
    ///
    /// [`FieldError::Path`] at the root, or when the draft holds a scalar or
    /// a mismatched container along the way.
    pub fn set_value(&self, value: impl Into<Option<Value>>) -> Result<(), FieldError> {
        self.form.set_at(&self.path, value.into())?;
        Ok(())
    }

    /// Replaces the draft value here with `update(current)`.
    ///
    /// ```rust
    /// use formwork::{Form, Schema};
    /// use serde_json::{json, Value};
    ///
    /// let form = Form::builder(Schema::object().field("tags", Schema::array(Schema::string())))
    ///     .initial_values(json!({"tags": ["a"]}))
    ///     .build();
    ///
    /// let tags = form.fields().field("tags").unwrap();
    /// tags.update_value(|current| {
    ///     let mut items = current.and_then(Value::as_array).cloned().unwrap_or_default();
    ///     items.push(json!("b"));
    ///     Some(Value::Array(items))
    /// })
    /// .unwrap();
    /// assert_eq!(tags.value(), Some(json!(["a", "b"])));
    /// ```
    ///
    /// # Errors
    ///
    /// As for [`set_value`](Self::set_value).
    pub fn update_value<F>(&self, update: F) -> Result<(), FieldError>
    where
        F: FnOnce(Option<&Value>) -> Option<Value>,
    {
        self.form.update_at(&self.path, update)?;
        Ok(())
    }

    /// Issues at or below this handle from the last validation.
    pub fn errors(&self) -> Vec<SchemaError> {
        self.form
            .errors()
            .map(|errors| errors.under_path(&self.path).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The issues at or below this handle rendered as one line.
    pub fn error_summary(&self, options: &SummaryOptions) -> Option<String> {
        summarize(&self.errors(), options)
    }

    /// Binds this location to an input element.
    pub fn register(&self) -> Registration {
        self.register_with(RegisterOptions::default())
    }

    /// Binds this location to an input element with options.
    pub fn register_with(&self, options: RegisterOptions) -> Registration {
        Registration::new(self.form.clone(), self.path.clone(), self.schema, options)
    }

    /// A snapshot binding for custom widgets that manage their own input.
    pub fn controlled(&self) -> Controlled<'f> {
        Controlled::new(self.clone())
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.path)
            .field("kind", &self.kind())
            .finish()
    }
}

fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
