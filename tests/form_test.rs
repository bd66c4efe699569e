//! End-to-end form behaviour: submit, live revalidation, dirtiness, defaults
//! and reset.

use std::sync::Arc;

use formwork::{Form, JsonPath, ObjectSchema, RevalidateMode, Schema, SchemaExt, SubmitEvent};
use futures::executor::block_on;
use parking_lot::Mutex;
use serde_json::{json, Value};

fn signup_schema() -> ObjectSchema {
    Schema::object()
        .field("name", Schema::string().min_len(1))
        .field("age", Schema::number().min(13.0))
}

fn signup() -> Form {
    Form::new(signup_schema())
}

/// Collects every value passed to a submit handler.
fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(Value) + Send + Sync + Clone + 'static) {
    let store = Arc::new(Mutex::new(Vec::new()));
    let sink = store.clone();
    (store, move |value| sink.lock().push(value))
}

#[test]
fn test_valid_submit_passes_parsed_value() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("john")).unwrap();
    form.field("age").unwrap().set_value(json!(18)).unwrap();

    let (received, handler) = recorder();
    assert!(block_on(form.submit(handler)));

    assert_eq!(*received.lock(), vec![json!({"name": "john", "age": 18})]);
    assert!(form.fields().errors().is_empty());
    assert!(form.errors().is_none());
}

#[test]
fn test_invalid_submit_skips_handler_and_scopes_errors() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("john")).unwrap();

    let (received, handler) = recorder();
    assert!(!block_on(form.submit(handler)));
    assert!(received.lock().is_empty());

    let age_errors = form.field("age").unwrap().errors();
    assert_eq!(age_errors.len(), 1);
    assert_eq!(age_errors[0].path, JsonPath::from_field("age"));
    assert_eq!(age_errors[0].code, "required");
    assert!(form.field("name").unwrap().errors().is_empty());
    assert!(form.is_validating_on_change());
}

#[test]
fn test_fix_after_failed_submit_updates_errors_without_resubmitting() {
    let form = signup();
    block_on(form.submit(|_| {}));
    assert_eq!(form.errors().map(|e| e.len()), Some(2));

    form.field("name").unwrap().set_value(json!("john")).unwrap();
    assert_eq!(form.errors().map(|e| e.len()), Some(1));

    form.field("age").unwrap().set_value(json!(10)).unwrap();
    assert_eq!(form.field("age").unwrap().errors()[0].code, "min_value");

    form.field("age").unwrap().set_value(json!(21)).unwrap();
    assert!(form.errors().is_none());
}

#[test]
fn test_no_live_validation_before_first_submit() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("")).unwrap();
    assert!(form.errors().is_none());
}

#[test]
fn test_on_change_mode_validates_from_the_start() {
    let form = Form::builder(Schema::object().field("name", Schema::string().min_len(2)))
        .revalidate(RevalidateMode::OnChange)
        .build();
    form.field("name").unwrap().set_value(json!("a")).unwrap();
    assert_eq!(form.field("name").unwrap().errors()[0].code, "min_length");
}

#[test]
fn test_dirty_after_change_and_clean_after_revert() {
    let form = Form::builder(signup_schema())
        .initial_values(json!({"name": "ada", "age": 36}))
        .build();
    assert!(!form.is_dirty());

    let name = form.field("name").unwrap();
    name.set_value(json!("grace")).unwrap();
    assert!(form.is_dirty());

    name.set_value(json!("ada")).unwrap();
    assert!(!form.is_dirty());
}

#[test]
fn test_array_delete_is_order_preserving() {
    let form = Form::builder(
        Schema::object().field("flowers", Schema::array(Schema::string().min_len(1))),
    )
    .initial_values(json!({"flowers": [""]}))
    .build();
    let flowers = form.field("flowers").unwrap();

    flowers
        .update_value(|current| {
            let mut items = current.and_then(Value::as_array).cloned().unwrap_or_default();
            items.push(json!("rose"));
            Some(Value::Array(items))
        })
        .unwrap();
    assert_eq!(flowers.value(), Some(json!(["", "rose"])));

    flowers
        .update_value(|current| {
            let mut items = current.and_then(Value::as_array).cloned().unwrap_or_default();
            items.remove(0);
            Some(Value::Array(items))
        })
        .unwrap();
    assert_eq!(flowers.value(), Some(json!(["rose"])));
    assert_eq!(form.field("flowers.0").unwrap().value(), Some(json!("rose")));
}

#[test]
fn test_nested_default_is_readable_before_interaction() {
    let form = Form::new(
        Schema::object().field("name", Schema::string()).field(
            "link",
            Schema::object()
                .field("label", Schema::string())
                .field("url", Schema::string().url())
                .with_default(json!({"label": "Home", "url": "https://example.com"})),
        ),
    );

    assert_eq!(
        form.field("link").unwrap().value(),
        Some(json!({"label": "Home", "url": "https://example.com"}))
    );
    assert_eq!(form.field("link.label").unwrap().value(), Some(json!("Home")));
    assert!(!form.is_dirty());
}

#[test]
fn test_reset_clears_errors_immediately() {
    let form = signup();
    block_on(form.submit(|_| {}));
    assert!(form.errors().is_some());

    form.reset(None);
    assert!(form.errors().is_none());
    assert!(!form.is_validating_on_change());

    // editing after reset does not validate until the next submit
    form.field("name").unwrap().set_value(json!("")).unwrap();
    assert!(form.errors().is_none());
}

#[test]
fn test_reset_to_new_values_sets_baseline() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("x")).unwrap();
    form.reset(Some(json!({"name": "ada", "age": 40})));
    assert!(!form.is_dirty());
    assert_eq!(form.baseline(), json!({"name": "ada", "age": 40}));

    form.field("age").unwrap().set_value(json!(41)).unwrap();
    assert!(form.is_dirty());
}

#[test]
fn test_handle_submit_marks_event_and_submits() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("john")).unwrap();
    form.field("age").unwrap().set_value(json!(30)).unwrap();

    let (received, handler) = recorder();
    let on_submit = form.handle_submit(handler);

    let event = SubmitEvent::new();
    on_submit(&event);
    assert!(event.default_prevented());
    assert!(event.propagation_stopped());
    assert_eq!(received.lock().len(), 1);

    // reusable
    on_submit(&SubmitEvent::new());
    assert_eq!(received.lock().len(), 2);
}

#[test]
fn test_submit_handler_can_clear_a_field() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("john")).unwrap();
    form.field("age").unwrap().set_value(json!(18)).unwrap();

    let handle = form.clone();
    let submitted = block_on(form.submit(move |_| {
        handle.field("name").unwrap().set_value(None).unwrap();
    }));

    assert!(submitted);
    assert_eq!(form.draft(), json!({"age": 18}));
    // the latch was set before the handler ran, so the write revalidated
    let errors = form.field("name").unwrap().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "required");
}

#[test]
fn test_handle_submit_handler_can_write_to_the_form() {
    let form = signup();
    form.field("name").unwrap().set_value(json!("john")).unwrap();
    form.field("age").unwrap().set_value(json!(30)).unwrap();

    let handle = form.clone();
    let on_submit = form.handle_submit(move |_| {
        handle.field("age").unwrap().set_value(json!(5)).unwrap();
    });
    on_submit(&SubmitEvent::new());

    assert_eq!(form.draft(), json!({"name": "john", "age": 5}));
    assert_eq!(
        form.field("age").unwrap().errors().first().map(|e| e.code.clone()),
        Some("min_value".to_string())
    );
}

#[test]
fn test_cross_field_issue_is_form_level() {
    let form = Form::new(
        Schema::object()
            .field("password", Schema::string().min_len(1))
            .field("confirm", Schema::string().min_len(1))
            .custom(|obj, path| {
                if obj.get("password") == obj.get("confirm") {
                    stillwater::Validation::Success(())
                } else {
                    stillwater::Validation::Failure(formwork::SchemaErrors::single(
                        formwork::SchemaError::new(path.clone(), "passwords differ")
                            .with_code("mismatch"),
                    ))
                }
            }),
    );
    form.field("password").unwrap().set_value(json!("a")).unwrap();
    form.field("confirm").unwrap().set_value(json!("b")).unwrap();
    block_on(form.validate());

    let flat = form.flattened_errors();
    assert_eq!(flat.form_errors.len(), 1);
    assert_eq!(flat.form_errors[0].code, "mismatch");
    assert!(flat.field_errors.is_empty());
    // issues at the root are visible from the root handle only
    assert!(form.field("password").unwrap().errors().is_empty());
    assert_eq!(form.fields().errors().len(), 1);
}

#[test]
fn test_defaults_fill_into_initial_values() {
    let form = Form::builder(
        Schema::object()
            .field("name", Schema::string())
            .default("role", Schema::string(), json!("user")),
    )
    .initial_values(json!({"name": "ada"}))
    .build();
    assert_eq!(form.draft(), json!({"name": "ada", "role": "user"}));
    assert_eq!(form.baseline(), form.draft());
}
