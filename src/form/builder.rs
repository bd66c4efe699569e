//! Form configuration.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::effect::AsyncValidator;
use crate::schema::defaults::apply_defaults;
use crate::schema::ValueValidator;

use super::Form;

/// Hands a validation run to the host's executor.
pub type Spawner = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// When the form validates on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevalidateMode {
    /// Only on submit until the first submit attempt, then on every change.
    #[default]
    AfterSubmit,
    /// On every change from the start.
    OnChange,
    /// Only on submit.
    OnSubmit,
}

impl RevalidateMode {
    /// Whether a fresh or reset form validates on change.
    pub(crate) fn initial_latch(self) -> bool {
        matches!(self, RevalidateMode::OnChange)
    }

    /// Whether a submit attempt turns on validation on change.
    pub(crate) fn latches_on_submit(self) -> bool {
        !matches!(self, RevalidateMode::OnSubmit)
    }
}

/// Builder for [`Form`].
///
/// ```rust
/// use formwork::{Form, RevalidateMode, Schema};
/// use serde_json::json;
///
/// let form = Form::builder(Schema::object().field("name", Schema::string()))
///     .initial_values(json!({"name": "ada"}))
///     .revalidate(RevalidateMode::OnChange)
///     .build();
///
/// assert_eq!(form.draft(), json!({"name": "ada"}));
/// assert!(form.is_validating_on_change());
/// ```
pub struct FormBuilder {
    schema: Box<dyn ValueValidator>,
    initial: Option<Value>,
    async_validators: Vec<Box<dyn AsyncValidator>>,
    spawner: Option<Spawner>,
    revalidate: RevalidateMode,
}

impl FormBuilder {
    pub(crate) fn new(schema: Box<dyn ValueValidator>) -> Self {
        Self {
            schema,
            initial: None,
            async_validators: Vec::new(),
            spawner: None,
            revalidate: RevalidateMode::default(),
        }
    }

    /// Starting values. Declared defaults fill the keys left out. Defaults to
    /// an empty object.
    pub fn initial_values(mut self, values: Value) -> Self {
        self.initial = Some(values);
        self
    }

    /// Adds a validator that runs after the schema accepts the draft.
    pub fn async_validator<V>(mut self, validator: V) -> Self
    where
        V: AsyncValidator + 'static,
    {
        self.async_validators.push(Box::new(validator));
        self
    }

    /// Runs change-triggered validation on the host's executor.
    ///
    /// Without a spawner those runs are driven to completion on the thread
    /// that changed the draft.
    pub fn spawner<F>(mut self, spawn: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        self.spawner = Some(Arc::new(spawn));
        self
    }

    /// Sets when the form validates on its own.
    pub fn revalidate(mut self, mode: RevalidateMode) -> Self {
        self.revalidate = mode;
        self
    }

    /// Builds the form.
    pub fn build(self) -> Form {
        let initial = self
            .initial
            .unwrap_or_else(|| Value::Object(Map::new()));
        let initial = apply_defaults(self.schema.as_ref(), initial);
        Form::from_parts(
            self.schema,
            self.async_validators,
            self.spawner,
            self.revalidate,
            initial,
        )
    }
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("initial", &self.initial)
            .field("async_validators", &self.async_validators.len())
            .field("spawner", &self.spawner.is_some())
            .field("revalidate", &self.revalidate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_latches() {
        assert!(!RevalidateMode::AfterSubmit.initial_latch());
        assert!(RevalidateMode::AfterSubmit.latches_on_submit());
        assert!(RevalidateMode::OnChange.initial_latch());
        assert!(!RevalidateMode::OnSubmit.initial_latch());
        assert!(!RevalidateMode::OnSubmit.latches_on_submit());
    }
}
