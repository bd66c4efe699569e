//! Navigation through nested, wrapped, recursive and combined schemas.

use formwork::{
    FieldError, Form, JsonPath, LeafKind, ObjectSchema, Schema, SchemaExt, SchemaKind,
    SummaryOptions, ValueValidator,
};
use futures::executor::block_on;
use serde_json::json;

fn order() -> Form {
    Form::new(
        Schema::object()
            .field("customer", Schema::object().field("email", Schema::string().email()))
            .field(
                "items",
                Schema::array(
                    Schema::object()
                        .field("sku", Schema::string().min_len(3))
                        .field("qty", Schema::integer().positive()),
                )
                .min_len(1),
            )
            .field(
                "shipping",
                Schema::object()
                    .field("street", Schema::string().min_len(1))
                    .field("city", Schema::string().min_len(1))
                    .nullable()
                    .optional(),
            ),
    )
}

#[test]
fn test_deep_write_creates_intermediate_containers() {
    let form = order();
    form.field("items.1.sku").unwrap().set_value(json!("abc")).unwrap();
    assert_eq!(form.draft(), json!({"items": [null, {"sku": "abc"}]}));

    form.field("customer.email").unwrap().set_value(json!("a@b.co")).unwrap();
    assert_eq!(form.draft()["customer"], json!({"email": "a@b.co"}));
}

#[test]
fn test_object_depth_errors_aggregate_descendants() {
    let form = Form::builder(order_schema())
        .initial_values(json!({
            "customer": {"email": "nope"},
            "items": [{"sku": "ab", "qty": 0}, {"sku": "abcd", "qty": 2}],
        }))
        .build();
    block_on(form.validate());

    let items = form.field("items").unwrap();
    assert_eq!(items.errors().len(), 2);
    assert_eq!(form.field("items.0").unwrap().errors().len(), 2);
    assert!(form.field("items.1").unwrap().errors().is_empty());
    assert_eq!(form.field("items.0.qty").unwrap().errors()[0].code, "positive");
    assert_eq!(form.field("customer").unwrap().errors().len(), 1);
    assert_eq!(form.fields().errors().len(), 3);
}

fn order_schema() -> ObjectSchema {
    Schema::object()
        .field("customer", Schema::object().field("email", Schema::string().email()))
        .field(
            "items",
            Schema::array(
                Schema::object()
                    .field("sku", Schema::string().min_len(3))
                    .field("qty", Schema::integer().positive()),
            ),
        )
}

#[test]
fn test_error_summary() {
    let form = Form::builder(order_schema())
        .initial_values(json!({
            "customer": {"email": "a@b.co"},
            "items": [{"sku": "ab", "qty": 0}],
        }))
        .build();
    block_on(form.validate());

    let first_item = form.field("items.0").unwrap();
    let summary = first_item.error_summary(&SummaryOptions::new().separator("; ")).unwrap();
    assert!(summary.contains("; "));
    assert_eq!(
        first_item.error_summary(&SummaryOptions::new().max(1).issue_map(|e| e.code.clone())),
        Some("min_length".to_string())
    );
    assert_eq!(form.field("customer").unwrap().error_summary(&SummaryOptions::new()), None);
}

#[test]
fn test_wrapped_object_navigates_like_object() {
    let form = order();
    let city = form.field("shipping.city").unwrap();
    assert_eq!(city.kind(), SchemaKind::Leaf(LeafKind::String));
    assert_eq!(city.name(), "shipping.city");
}

#[test]
fn test_unknown_nested_key_reports_location() {
    let form = order();
    let err = form.field("customer.phone").unwrap_err();
    match err {
        FieldError::NoSuchField { path, key, expected, found } => {
            assert_eq!(path, JsonPath::from_field("customer"));
            assert_eq!(key, "phone");
            assert_eq!(expected, "one of: email");
            assert_eq!(found, "object");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_index_on_object_and_key_on_array_fail() {
    let form = order();
    assert!(form.field("customer.0").is_err());
    assert!(matches!(
        form.field("items.first"),
        Err(FieldError::NoSuchField { .. })
    ));
    assert!(form.fields().field("items").unwrap().index(0).is_ok());
}

fn category() -> ObjectSchema {
    Schema::object()
        .field("name", Schema::string().min_len(1))
        .field("children", Schema::array(Schema::lazy(category)))
}

#[test]
fn test_recursive_schema_navigation() {
    let form = Form::new(category());
    let grandchild = form.field("children.0.children.2.name").unwrap();
    assert_eq!(grandchild.kind(), SchemaKind::Leaf(LeafKind::String));

    grandchild.set_value(json!("deep")).unwrap();
    assert_eq!(
        form.draft(),
        json!({"children": [{"children": [null, null, {"name": "deep"}]}]})
    );
}

fn shape() -> ObjectSchema {
    Schema::object().field(
        "shape",
        Schema::union(vec![
            Box::new(
                Schema::object()
                    .field("kind", Schema::literal("circle"))
                    .field("radius", Schema::number().positive()),
            ) as Box<dyn ValueValidator>,
            Box::new(
                Schema::object()
                    .field("kind", Schema::literal("rect"))
                    .field("width", Schema::number().positive())
                    .field("height", Schema::number().positive()),
            ),
        ]),
    )
}

#[test]
fn test_union_exposes_every_alternative_key() {
    let form = Form::new(shape());
    for key in ["shape.kind", "shape.radius", "shape.width", "shape.height"] {
        assert!(form.field(key).is_ok(), "{key} should be addressable");
    }
    assert!(form.field("shape.side").is_err());
}

#[test]
fn test_union_errors_stay_addressable() {
    let form = Form::builder(shape())
        .initial_values(json!({"shape": {"kind": "rect", "width": 2}}))
        .build();
    block_on(form.validate());
    let height = form.field("shape.height").unwrap().errors();
    assert_eq!(height.len(), 1);
    assert_eq!(height[0].code, "required");
}

#[test]
fn test_intersection_navigates_both_sides() {
    let form = Form::new(Schema::object().field(
        "user",
        Schema::intersection(
            Schema::object().field("id", Schema::integer()),
            Schema::object().field("email", Schema::string().email()),
        ),
    ));
    form.field("user.id").unwrap().set_value(json!(1)).unwrap();
    form.field("user.email").unwrap().set_value(json!("x")).unwrap();
    block_on(form.validate());
    assert_eq!(form.field("user.email").unwrap().errors()[0].code, "invalid_email");
    assert!(form.field("user.id").unwrap().errors().is_empty());
}

#[test]
fn test_conflicting_alternatives_are_rejected() {
    let form = Form::new(Schema::object().field(
        "contact",
        Schema::union(vec![
            Box::new(Schema::object().field("value", Schema::string())) as Box<dyn ValueValidator>,
            Box::new(Schema::object().field("value", Schema::object().field("a", Schema::string()))),
        ]),
    ));
    assert!(matches!(
        form.field("contact.value"),
        Err(FieldError::AmbiguousShape { ref key, .. }) if key == "value"
    ));
}

#[test]
fn test_set_through_scalar_is_a_contract_violation() {
    let form = Form::builder(order_schema())
        .initial_values(json!({"customer": "not an object"}))
        .build();
    let err = form.field("customer.email").unwrap().set_value(json!("a@b.co")).unwrap_err();
    assert!(matches!(
        err,
        FieldError::Path(formwork::DeepPathError::TraversePrimitive { found: "string", .. })
    ));
}

#[test]
fn test_far_out_of_range_index_is_a_contract_violation() {
    let form = order();
    let items = form.field("items").unwrap();

    let err = items.index(usize::MAX).unwrap().set_value(json!({"sku": "abc"})).unwrap_err();
    assert!(matches!(
        err,
        FieldError::Path(formwork::DeepPathError::IndexOutOfRange { index: usize::MAX, len: 0, .. })
    ));

    let huge = format!("items.{}.sku", usize::MAX);
    let err = form.field(&huge).unwrap().set_value(json!("abc")).unwrap_err();
    assert!(matches!(err, FieldError::Path(_)));
    assert_eq!(form.draft(), json!({}));
}
