//! Bindings for custom widgets.

use serde_json::Value;

use crate::error::{FieldError, SchemaError};
use crate::schema::ValueValidator;

use super::chain::Field;

/// A snapshot of one field for widgets that manage their own input, such as
/// date pickers or tag editors.
///
/// The public data reflects the form at the time
/// [`Field::controlled`] was called. Writes go through [`on_change`](Self::on_change).
#[derive(Debug, Clone)]
pub struct Controlled<'f> {
    /// Dotted field name.
    pub name: String,
    /// Draft value, `None` when absent.
    pub value: Option<Value>,
    /// Issues at or below the field.
    pub errors: Vec<SchemaError>,
    field: Field<'f>,
}

impl<'f> Controlled<'f> {
    pub(crate) fn new(field: Field<'f>) -> Self {
        Self {
            name: field.name(),
            value: field.value(),
            errors: field.errors(),
            field,
        }
    }

    /// The schema node behind the field.
    pub fn schema(&self) -> &'f dyn ValueValidator {
        self.field.schema()
    }

    /// The field this snapshot was taken from.
    pub fn field(&self) -> &Field<'f> {
        &self.field
    }

    /// Writes a new value for the field.
    ///
    /// # Errors
    ///
    /// As for [`Field::set_value`].
    pub fn on_change(&self, value: impl Into<Option<Value>>) -> Result<(), FieldError> {
        self.field.set_value(value)
    }
}
