//! The form controller.
//!
//! A [`Form`] owns the draft, the baseline it is compared against for
//! dirtiness, the issues of the last validation and the elements attached to
//! its fields. Every draft change goes through one write path, which reflects
//! the new draft onto attached elements and, once live validation is on,
//! schedules a validation run.
//!
//! Validation runs are numbered. A run only stores its result if no newer run
//! was started in the meantime, so a slow check for an old draft never
//! overwrites the issues of a newer one.
//!
//! # Example
//!
//! ```rust
//! use formwork::{Form, Schema};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let form = Form::new(
//!     Schema::object()
//!         .field("name", Schema::string().min_len(1))
//!         .field("age", Schema::number().min(13.0)),
//! );
//! let fields = form.fields();
//!
//! fields.field("name").unwrap().set_value(json!("john")).unwrap();
//! assert!(form.is_dirty());
//!
//! let submitted = block_on(form.submit(|value| assert_eq!(value["name"], "john")));
//! assert!(!submitted);
//! assert!(!fields.field("age").unwrap().errors().is_empty());
//! assert!(fields.field("name").unwrap().errors().is_empty());
//! ```

mod builder;
mod submit;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::Context;

use futures::executor;
use futures::future::{BoxFuture, FutureExt};
use futures::task::noop_waker;
use parking_lot::Mutex;
use serde_json::Value;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::deep;
use crate::effect::async_validator::run_all;
use crate::effect::AsyncValidator;
use crate::error::{DeepPathError, FieldError, FlattenedErrors, SchemaErrors};
use crate::field::{reflect, ElementRegistry, Field, InputElement};
use crate::path::JsonPath;
use crate::schema::defaults::apply_defaults;
use crate::schema::{SchemaLike, ValueValidator};

pub use builder::{FormBuilder, RevalidateMode, Spawner};
pub use submit::SubmitEvent;

/// A form bound to a schema.
///
/// `Form` is a cheap handle; clones share the same state.
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

struct FormInner {
    schema: Box<dyn ValueValidator>,
    async_validators: Vec<Box<dyn AsyncValidator>>,
    spawner: Option<Spawner>,
    revalidate: RevalidateMode,
    initial: Value,
    state: Mutex<FormState>,
    deferred: Mutex<Vec<BoxFuture<'static, ()>>>,
}

struct FormState {
    draft: Value,
    baseline: Value,
    errors: Option<SchemaErrors>,
    validate_on_change: bool,
    elements: ElementRegistry,
    validation_seq: u64,
}

type Reflection = (Arc<dyn InputElement>, Option<Value>);

impl Form {
    /// Creates a form with default settings and an empty initial draft.
    pub fn new<S: SchemaLike + 'static>(schema: S) -> Self {
        Self::builder(schema).build()
    }

    /// Starts configuring a form.
    pub fn builder<S: SchemaLike + 'static>(schema: S) -> FormBuilder {
        FormBuilder::new(Box::new(schema))
    }

    pub(crate) fn from_parts(
        schema: Box<dyn ValueValidator>,
        async_validators: Vec<Box<dyn AsyncValidator>>,
        spawner: Option<Spawner>,
        revalidate: RevalidateMode,
        initial: Value,
    ) -> Self {
        let state = FormState {
            draft: initial.clone(),
            baseline: initial.clone(),
            errors: None,
            validate_on_change: revalidate.initial_latch(),
            elements: ElementRegistry::new(),
            validation_seq: 0,
        };
        Self {
            inner: Arc::new(FormInner {
                schema,
                async_validators,
                spawner,
                revalidate,
                initial,
                state: Mutex::new(state),
                deferred: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The root schema.
    pub fn schema(&self) -> &dyn ValueValidator {
        self.inner.schema.as_ref()
    }

    /// The handle for the whole draft, where navigation starts.
    pub fn fields(&self) -> Field<'_> {
        Field::root(self)
    }

    /// Shorthand for `fields().at(dotted)`.
    ///
    /// # Errors
    ///
    /// As for [`Field::at`].
    pub fn field(&self, dotted: &str) -> Result<Field<'_>, FieldError> {
        self.fields().at(dotted)
    }

    /// A copy of the current draft.
    pub fn draft(&self) -> Value {
        self.inner.state.lock().draft.clone()
    }

    /// A copy of the value the draft is compared against.
    pub fn baseline(&self) -> Value {
        self.inner.state.lock().baseline.clone()
    }

    /// The draft value at `path`, `None` when absent.
    pub fn value_at(&self, path: &JsonPath) -> Option<Value> {
        deep::get(&self.inner.state.lock().draft, path).cloned()
    }

    /// Whether the draft differs from the baseline.
    pub fn is_dirty(&self) -> bool {
        let state = self.inner.state.lock();
        !deep::equal(&state.draft, &state.baseline)
    }

    /// Issues from the last completed validation, `None` if it passed or
    /// none has completed.
    pub fn errors(&self) -> Option<SchemaErrors> {
        self.inner.state.lock().errors.clone()
    }

    /// The last issues grouped by top-level field.
    pub fn flattened_errors(&self) -> FlattenedErrors {
        self.errors()
            .map(|errors| errors.flatten())
            .unwrap_or_default()
    }

    /// Whether draft changes currently trigger validation.
    pub fn is_validating_on_change(&self) -> bool {
        self.inner.state.lock().validate_on_change
    }

    /// Keys of the attached elements, in attachment order.
    pub fn element_keys(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .elements
            .keys()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn set_at(&self, path: &JsonPath, value: Option<Value>) -> Result<(), DeepPathError> {
        self.write_draft(|draft| deep::set(draft, path, value))
    }

    /// `update` runs with the form locked and must not call back into it.
    pub(crate) fn update_at<F>(&self, path: &JsonPath, update: F) -> Result<(), DeepPathError>
    where
        F: FnOnce(Option<&Value>) -> Option<Value>,
    {
        self.write_draft(|draft| {
            let next = update(deep::get(draft, path));
            deep::set(draft, path, next)
        })
    }

    fn write_draft<F>(&self, write: F) -> Result<(), DeepPathError>
    where
        F: FnOnce(&Value) -> Result<Value, DeepPathError>,
    {
        let (targets, revalidate) = {
            let mut state = self.inner.state.lock();
            let next = write(&state.draft)?;
            if deep::equal(&next, &state.draft) {
                trace!("draft unchanged");
                return Ok(());
            }
            state.draft = next;
            (reflection_targets(&state), state.validate_on_change)
        };
        reflect_all(targets);
        if revalidate {
            self.revalidate();
        }
        Ok(())
    }

    fn revalidate(&self) {
        trace!("draft changed, revalidating");
        let run = self.validate();
        self.dispatch(Box::pin(async move {
            run.await;
        }));
    }

    /// Hands `task` to the spawner, or runs it here when there is none.
    ///
    /// Without a spawner the task is polled once, which completes any run
    /// whose async validators are ready. A task that is still pending is
    /// driven to completion with `block_on`, unless this thread is already
    /// inside an executor (a submit handler writing to the form). Then it is
    /// queued and awaited by the enclosing validation or submit.
    fn dispatch(&self, mut task: BoxFuture<'static, ()>) {
        if let Some(spawn) = &self.inner.spawner {
            spawn(task);
            return;
        }
        let waker = noop_waker();
        if task.poll_unpin(&mut Context::from_waker(&waker)).is_ready() {
            return;
        }
        match executor::enter() {
            Ok(guard) => {
                drop(guard);
                executor::block_on(task);
            }
            Err(_) => {
                trace!("inside an executor, deferring validation run");
                self.inner.deferred.lock().push(task);
            }
        }
    }

    /// Awaits the runs [`dispatch`](Self::dispatch) queued, including any
    /// they queue in turn.
    async fn drain_deferred(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.inner.deferred.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task.await;
            }
        }
    }

    /// Validates the current draft.
    ///
    /// The draft is captured and the run numbered when this is called, not
    /// when the future is first polled. On completion the run replaces the
    /// stored issues unless a newer run was started or the form was reset in
    /// the meantime.
    ///
    /// Resolves to the parsed value when valid, `None` when invalid or
    /// superseded.
    pub fn validate(&self) -> impl Future<Output = Option<Value>> + Send + 'static {
        let (ticket, draft) = {
            let mut state = self.inner.state.lock();
            state.validation_seq += 1;
            (state.validation_seq, state.draft.clone())
        };
        debug!(ticket, "validation started");
        let form = self.clone();
        async move {
            let root = JsonPath::root();
            let outcome = match form.inner.schema.validate_value(&draft, &root) {
                Validation::Success(parsed) => {
                    match run_all(&form.inner.async_validators, &parsed, &root).await {
                        Validation::Success(()) => Ok(parsed),
                        Validation::Failure(errors) => Err(errors),
                    }
                }
                Validation::Failure(errors) => Err(errors),
            };
            let parsed = form.finish_validation(ticket, outcome);
            form.drain_deferred().await;
            parsed
        }
    }

    fn finish_validation(
        &self,
        ticket: u64,
        outcome: Result<Value, SchemaErrors>,
    ) -> Option<Value> {
        let mut state = self.inner.state.lock();
        if state.validation_seq != ticket {
            debug!(ticket, latest = state.validation_seq, "validation superseded");
            return None;
        }
        match outcome {
            Ok(parsed) => {
                debug!(ticket, "validation passed");
                state.errors = None;
                Some(parsed)
            }
            Err(errors) => {
                debug!(ticket, issues = errors.len(), "validation failed");
                state.errors = Some(errors);
                None
            }
        }
    }

    /// Validates and passes the parsed value to `handler` when valid.
    ///
    /// Afterwards draft changes trigger validation, unless the form was built
    /// with [`RevalidateMode::OnSubmit`]. Resolves to whether `handler` ran.
    pub fn submit<H>(&self, handler: H) -> impl Future<Output = bool> + Send + 'static
    where
        H: FnOnce(Value) + Send + 'static,
    {
        debug!("submit");
        let form = self.clone();
        let run = self.validate();
        async move {
            let parsed = run.await;
            if form.inner.revalidate.latches_on_submit() {
                form.inner.state.lock().validate_on_change = true;
            }
            let handled = match parsed {
                Some(value) => {
                    handler(value);
                    true
                }
                None => false,
            };
            form.drain_deferred().await;
            handled
        }
    }

    /// Restores the form to `values`, or to the initial values.
    ///
    /// Draft and baseline both become `values` with declared defaults filled
    /// in. Stored issues are cleared, runs still in flight are discarded and
    /// validation on change returns to its initial setting.
    pub fn reset(&self, values: Option<Value>) {
        let values = match values {
            Some(values) => apply_defaults(self.schema(), values),
            None => self.inner.initial.clone(),
        };
        let targets = {
            let mut state = self.inner.state.lock();
            state.validate_on_change = self.inner.revalidate.initial_latch();
            state.baseline = values.clone();
            state.draft = values;
            state.errors = None;
            state.validation_seq += 1;
            reflection_targets(&state)
        };
        debug!("form reset");
        reflect_all(targets);
    }

    pub(crate) fn attach_element(&self, key: String, path: JsonPath, element: Arc<dyn InputElement>) {
        let value = {
            let mut state = self.inner.state.lock();
            let value = deep::get(&state.draft, &path).cloned();
            state.elements.insert(key.clone(), path, element.clone());
            value
        };
        trace!(%key, "element attached");
        reflect(element.as_ref(), value.as_ref());
    }

    pub(crate) fn detach_element(&self, key: &str) {
        if self.inner.state.lock().elements.remove(key).is_some() {
            trace!(%key, "element detached");
        }
    }
}

fn reflection_targets(state: &FormState) -> Vec<Reflection> {
    state
        .elements
        .snapshot()
        .into_iter()
        .map(|bound| {
            let value = deep::get(&state.draft, &bound.path).cloned();
            (bound.element, value)
        })
        .collect()
}

fn reflect_all(targets: Vec<Reflection>) {
    for (element, value) in targets {
        reflect(element.as_ref(), value.as_ref());
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Form")
            .field("draft", &state.draft)
            .field("dirty", &!deep::equal(&state.draft, &state.baseline))
            .field("errors", &state.errors.as_ref().map(SchemaErrors::len))
            .field("validate_on_change", &state.validate_on_change)
            .field("elements", &state.elements.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaExt};
    use futures::executor::block_on;
    use serde_json::json;

    fn signup() -> Form {
        Form::new(
            Schema::object()
                .field("name", Schema::string().min_len(1))
                .field("age", Schema::number().min(13.0)),
        )
    }

    #[test]
    fn test_fresh_form_is_clean() {
        let form = signup();
        assert_eq!(form.draft(), json!({}));
        assert!(!form.is_dirty());
        assert!(form.errors().is_none());
        assert!(!form.is_validating_on_change());
    }

    #[test]
    fn test_dirty_tracks_baseline() {
        let form = signup();
        let name = form.field("name").unwrap();
        name.set_value(json!("x")).unwrap();
        assert!(form.is_dirty());
        name.set_value(None).unwrap();
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_validate_replaces_errors() {
        let form = signup();
        assert_eq!(block_on(form.validate()), None);
        assert_eq!(form.errors().map(|e| e.len()), Some(2));

        form.field("name").unwrap().set_value(json!("john")).unwrap();
        assert_eq!(block_on(form.validate()), None);
        assert_eq!(form.errors().map(|e| e.len()), Some(1));

        form.field("age").unwrap().set_value(json!(18)).unwrap();
        assert_eq!(
            block_on(form.validate()),
            Some(json!({"name": "john", "age": 18}))
        );
        assert!(form.errors().is_none());
    }

    #[test]
    fn test_superseded_run_is_discarded() {
        let form = signup();
        let stale = form.validate();
        form.field("name").unwrap().set_value(json!("john")).unwrap();
        let fresh = form.validate();

        assert_eq!(block_on(fresh), None);
        assert_eq!(form.errors().map(|e| e.len()), Some(1));
        // the older run finishes last and must not overwrite the newer issues
        assert_eq!(block_on(stale), None);
        assert_eq!(form.errors().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_submit_latches_live_validation() {
        let form = signup();
        assert!(!block_on(form.submit(|_| panic!("invalid draft submitted"))));
        assert!(form.is_validating_on_change());

        form.field("name").unwrap().set_value(json!("john")).unwrap();
        form.field("age").unwrap().set_value(json!(20)).unwrap();
        // inline revalidation already cleared the issues
        assert!(form.errors().is_none());
    }

    #[test]
    fn test_on_submit_mode_never_latches() {
        let form = Form::builder(Schema::object().field("name", Schema::string()))
            .revalidate(RevalidateMode::OnSubmit)
            .build();
        block_on(form.submit(|_| {}));
        assert!(!form.is_validating_on_change());
    }

    #[test]
    fn test_reset_clears_errors_and_latch() {
        let form = signup();
        block_on(form.submit(|_| {}));
        assert!(form.errors().is_some());

        form.reset(Some(json!({"name": "ada"})));
        assert!(form.errors().is_none());
        assert!(!form.is_validating_on_change());
        assert!(!form.is_dirty());
        assert_eq!(form.baseline(), json!({"name": "ada"}));

        form.reset(None);
        assert_eq!(form.draft(), json!({}));
    }

    #[test]
    fn test_reset_fills_defaults() {
        let form = Form::new(
            Schema::object()
                .field("name", Schema::string())
                .field("role", Schema::string().with_default(json!("user"))),
        );
        assert_eq!(form.draft(), json!({"role": "user"}));
        form.reset(Some(json!({"name": "x"})));
        assert_eq!(form.draft(), json!({"name": "x", "role": "user"}));
    }

    #[test]
    fn test_identical_write_is_skipped() {
        let form = Form::builder(Schema::object().field("n", Schema::number()))
            .initial_values(json!({"n": 1}))
            .build();
        form.field("n").unwrap().set_value(json!(1.0)).unwrap();
        assert_eq!(form.draft(), json!({"n": 1}));
    }

    #[test]
    fn test_flattened_errors_group_by_field() {
        let form = signup();
        block_on(form.validate());
        let flat = form.flattened_errors();
        assert!(flat.form_errors.is_empty());
        assert_eq!(flat.field("name").len(), 1);
        assert_eq!(flat.field("age").len(), 1);
    }
}
