//! Filling declared defaults into a draft.
//!
//! A fresh form should show what the schema declares for fields the caller
//! left out. [`apply_defaults`] walks the schema alongside the draft and
//! inserts each absent object key whose schema declares a default. It never
//! replaces a present value and never invents values for keys without a
//! declared default.

use serde_json::Value;

use super::traits::{Shape, ValueValidator};

/// Returns `draft` with declared defaults filled into absent object keys.
///
/// Descends into present objects and array items. Union alternatives are not
/// descended into, since which alternative applies is unknown until the draft
/// is validated.
///
/// ```rust
/// use formwork::schema::defaults::apply_defaults;
/// use formwork::{Schema, SchemaExt};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string())
///     .field(
///         "link",
///         Schema::object()
///             .field("label", Schema::string())
///             .field("url", Schema::string().url())
///             .with_default(json!({"label": "Home", "url": "https://example.com"})),
///     );
///
/// let draft = apply_defaults(&schema, json!({"name": "x"}));
/// assert_eq!(draft["link"]["label"], json!("Home"));
/// assert_eq!(draft["name"], json!("x"));
/// ```
pub fn apply_defaults(schema: &dyn ValueValidator, mut draft: Value) -> Value {
    fill(schema, &mut draft);
    draft
}

fn fill(schema: &dyn ValueValidator, value: &mut Value) {
    match schema.describe_shape() {
        Shape::Wrapper(inner) => fill(inner, value),
        Shape::Object(children) => {
            let Value::Object(map) = value else {
                return;
            };
            for (name, child) in children {
                match map.get_mut(name) {
                    Some(present) => fill(child, present),
                    None => {
                        if let Some(mut default) = child.declared_default() {
                            fill(child, &mut default);
                            map.insert(name.to_string(), default);
                        }
                    }
                }
            }
        }
        Shape::Intersection(left, right) => {
            fill(left, value);
            fill(right, value);
        }
        Shape::Array(element) => {
            if let Value::Array(items) = value {
                for item in items {
                    fill(element, item);
                }
            }
        }
        Shape::Union(_) | Shape::Leaf(_) => {}
    }
}
