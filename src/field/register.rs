//! Element bindings.
//!
//! A [`Registration`] is what a host spreads onto a native input: a name,
//! a change handler and a ref callback. It owns a handle to the form, so it
//! can be stored in callbacks that outlive the [`Field`](super::Field) it came
//! from.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::FieldError;
use crate::form::Form;
use crate::path::JsonPath;
use crate::resolve::{self, SchemaKind};
use crate::schema::ValueValidator;

use super::element::{display_value, ChangeEvent, ElementKind, InputElement};

/// Called after a change event wrote to the draft, with the value written.
pub type ChangeHook = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Options for [`Field::register_with`](super::Field::register_with).
#[derive(Clone, Default)]
pub struct RegisterOptions {
    on_change: Option<ChangeHook>,
}

impl RegisterOptions {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `hook` after every change event that writes to the draft.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RegisterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterOptions")
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Leaf { accepts_text: bool },
    Container(SchemaKind),
}

/// A binding between one draft location and the host's input elements.
///
/// ```rust
/// use formwork::{ChangeEvent, Form, Schema, SchemaExt};
/// use serde_json::json;
///
/// let form = Form::new(
///     Schema::object()
///         .field("name", Schema::string())
///         .field("age", Schema::number().coerce().optional()),
/// );
///
/// let age = form.fields().field("age").unwrap().register();
/// age.on_change(&ChangeEvent::text("18")).unwrap();
/// assert_eq!(form.draft(), json!({"age": "18"}));
///
/// // clearing a number input leaves the field absent, not ""
/// age.on_change(&ChangeEvent::text("")).unwrap();
/// assert_eq!(form.draft(), json!({}));
/// ```
pub struct Registration {
    form: Form,
    path: JsonPath,
    name: String,
    target: Target,
    options: RegisterOptions,
    attached: Mutex<Vec<String>>,
}

impl Registration {
    pub(crate) fn new(
        form: Form,
        path: JsonPath,
        schema: &dyn ValueValidator,
        options: RegisterOptions,
    ) -> Self {
        let target = match resolve::leaf_kind(schema) {
            Some(kind) => Target::Leaf {
                accepts_text: kind.accepts_text(),
            },
            None => Target::Container(resolve::kind_of(schema)),
        };
        Self {
            name: path.name(),
            form,
            path,
            target,
            options,
            attached: Mutex::new(Vec::new()),
        }
    }

    /// The field name to put on the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The draft location this binding writes to.
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// The current draft value as an element would show it.
    pub fn value(&self) -> String {
        display_value(self.form.value_at(&self.path).as_ref())
    }

    /// Writes an element's input to the draft.
    ///
    /// Checkboxes write their checked flag. Radios write their value when
    /// they become checked and are ignored otherwise. Empty text on a field
    /// that does not accept text clears the field.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotALeaf`] when this binding sits on an object or array,
    /// [`FieldError::Path`] when the draft cannot hold a value here.
    pub fn on_change(&self, event: &ChangeEvent) -> Result<(), FieldError> {
        let accepts_text = match self.target {
            Target::Leaf { accepts_text } => accepts_text,
            Target::Container(kind) => {
                warn!(field = %self.name, %kind, "change event on a container field");
                return Err(FieldError::NotALeaf {
                    name: self.name.clone(),
                    found: kind.to_string(),
                })
            }
        };

        let value = match event.kind {
            ElementKind::Checkbox => Some(Value::Bool(event.checked)),
            ElementKind::Radio if !event.checked => return Ok(()),
            _ if event.value.is_empty() && !accepts_text => None,
            _ => Some(Value::String(event.value.clone())),
        };

        trace!(field = %self.name, ?value, "change event");
        self.form.set_at(&self.path, value.clone())?;
        if let Some(hook) = &self.options.on_change {
            hook(value.as_ref());
        }
        Ok(())
    }

    /// The ref callback.
    ///
    /// `Some(element)` attaches the element and shows the current draft value
    /// on it. Radios are keyed `name.value`, so every option of a group can be
    /// attached through the same binding. `None` detaches every element this
    /// binding attached.
    pub fn element_ref(&self, element: Option<Arc<dyn InputElement>>) {
        let mut attached = self.attached.lock();
        match element {
            Some(element) => {
                let key = match element.kind() {
                    ElementKind::Radio => format!("{}.{}", self.name, element.value()),
                    _ => self.name.clone(),
                };
                self.form.attach_element(key.clone(), self.path.clone(), element);
                if !attached.contains(&key) {
                    attached.push(key);
                }
            }
            None => {
                for key in attached.drain(..) {
                    self.form.detach_element(&key);
                }
            }
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("attached", &*self.attached.lock())
            .finish()
    }
}
