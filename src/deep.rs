//! Deep get, set and equality over partially populated drafts.
//!
//! Drafts are `serde_json::Value` trees in which any key may be absent.
//! Absence is `None` and propagates silently through [`get`]. [`set`] builds
//! missing containers from the kind of the segment that addresses them and
//! reports structural mismatches as [`DeepPathError`].
//!
//! ```rust
//! use formwork::{deep, JsonPath};
//! use serde_json::json;
//!
//! let path = JsonPath::from_field("flowers").push_index(1).push_field("name");
//! let draft = deep::set(&json!({}), &path, Some(json!("tulip"))).unwrap();
//!
//! assert_eq!(draft, json!({"flowers": [null, {"name": "tulip"}]}));
//! assert_eq!(deep::get(&draft, &path), Some(&json!("tulip")));
//! ```

use chrono::DateTime;
use serde_json::{Map, Value};

use crate::error::DeepPathError;
use crate::path::{JsonPath, PathSegment};

/// How many `null` slots [`set`] may insert to reach an index past the end
/// of an array.
pub const MAX_ARRAY_PADDING: usize = 1024;

/// Reads the value at `path`.
///
/// Returns `None` when any step is absent, is `null`, or is not the kind of
/// container its segment addresses. The root path returns `container` itself.
pub fn get<'a>(container: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    let mut current = container;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Field(key), Value::Object(map)) => map.get(key)?,
            (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns a copy of `container` with the value at `path` replaced.
///
/// `None` removes an object key, or stores `null` in an array slot. Siblings
/// along the path are preserved. Missing and `null` intermediates become an
/// object or an array according to the segment that addresses them; arrays
/// written past their end are padded with `null`.
///
/// # Errors
///
/// - [`DeepPathError::EmptyPath`] for the root path
/// - [`DeepPathError::TraversePrimitive`] when a scalar sits on the path
/// - [`DeepPathError::KindMismatch`] when a field segment meets an array or
///   an index segment meets an object
/// - [`DeepPathError::IndexOutOfRange`] when an index lies more than
///   [`MAX_ARRAY_PADDING`] slots past the end of its array
pub fn set(
    container: &Value,
    path: &JsonPath,
    value: Option<Value>,
) -> Result<Value, DeepPathError> {
    if path.is_empty() {
        return Err(DeepPathError::EmptyPath);
    }
    let mut next = container.clone();
    set_in_place(&mut next, path.as_slice(), value, JsonPath::root())?;
    Ok(next)
}

fn set_in_place(
    current: &mut Value,
    segments: &[PathSegment],
    value: Option<Value>,
    walked: JsonPath,
) -> Result<(), DeepPathError> {
    let Some((head, tail)) = segments.split_first() else {
        return Err(DeepPathError::EmptyPath);
    };

    if current.is_null() {
        *current = empty_container_for(head);
    }

    match (head, current) {
        (PathSegment::Field(key), Value::Object(map)) => {
            if tail.is_empty() {
                match value {
                    Some(v) => {
                        map.insert(key.clone(), v);
                    }
                    None => {
                        map.remove(key);
                    }
                }
                return Ok(());
            }
            let child = map.entry(key.clone()).or_insert(Value::Null);
            set_in_place(child, tail, value, walked.push_field(key.clone()))
        }
        (PathSegment::Index(idx), Value::Array(items)) => {
            let idx = *idx;
            if tail.is_empty() {
                match value {
                    Some(v) => *slot_mut(items, idx, &walked)? = v,
                    None => {
                        if let Some(slot) = items.get_mut(idx) {
                            *slot = Value::Null;
                        }
                    }
                }
                return Ok(());
            }
            let slot = slot_mut(items, idx, &walked)?;
            set_in_place(slot, tail, value, walked.push_index(idx))
        }
        (PathSegment::Field(_), Value::Array(_)) => Err(DeepPathError::KindMismatch {
            path: walked,
            expected: "object",
            found: "array",
        }),
        (PathSegment::Index(_), Value::Object(_)) => Err(DeepPathError::KindMismatch {
            path: walked,
            expected: "array",
            found: "object",
        }),
        (_, other) => Err(DeepPathError::TraversePrimitive {
            path: walked,
            found: type_name(other),
        }),
    }
}

/// Returns the slot at `idx`, padding the array with `null` when it is
/// written past its end by at most [`MAX_ARRAY_PADDING`] slots.
fn slot_mut<'a>(
    items: &'a mut Vec<Value>,
    idx: usize,
    walked: &JsonPath,
) -> Result<&'a mut Value, DeepPathError> {
    let len = items.len();
    if idx >= len {
        let out_of_range = || DeepPathError::IndexOutOfRange {
            path: walked.clone(),
            index: idx,
            len,
        };
        if idx - len > MAX_ARRAY_PADDING {
            return Err(out_of_range());
        }
        let new_len = idx.checked_add(1).ok_or_else(out_of_range)?;
        items.resize(new_len, Value::Null);
    }
    Ok(&mut items[idx])
}

fn empty_container_for(segment: &PathSegment) -> Value {
    match segment {
        PathSegment::Field(_) => Value::Object(Map::new()),
        PathSegment::Index(_) => Value::Array(Vec::new()),
    }
}

/// Deep structural equality.
///
/// Objects compare by key set, ignoring insertion order. Numbers compare by
/// numeric value, so `1` equals `1.0`. Two strings that both parse as RFC 3339
/// timestamps are equal when they denote the same instant.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            x == y
                || match (x.as_f64(), y.as_f64()) {
                    (Some(p), Some(q)) => p == q,
                    _ => false,
                }
        }
        (Value::String(x), Value::String(y)) => x == y || same_instant(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| equal(x, y)))
        }
        _ => false,
    }
}

/// Deep equality over possibly absent values.
pub fn equal_opt(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => equal(x, y),
        _ => false,
    }
}

fn same_instant(a: &str, b: &str) -> bool {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// Returns true if `candidate` starts with `prefix`, comparing raw keys only.
pub fn path_starts_with(candidate: &JsonPath, prefix: &JsonPath) -> bool {
    candidate.starts_with(prefix)
}

/// Returns the JSON type name for a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(keys: &[&str]) -> JsonPath {
        keys.iter()
            .map(|k| match k.parse::<usize>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::field(*k),
            })
            .collect()
    }

    #[test]
    fn test_get_root_returns_container() {
        let draft = json!({"a": 1});
        assert_eq!(get(&draft, &JsonPath::root()), Some(&draft));
    }

    #[test]
    fn test_get_absent_propagates() {
        let draft = json!({"a": {"b": null}});
        assert_eq!(get(&draft, &p(&["missing", "deeper"])), None);
        assert_eq!(get(&draft, &p(&["a", "b", "c"])), None);
        assert_eq!(get(&draft, &p(&["a", "b"])), Some(&Value::Null));
    }

    #[test]
    fn test_get_kind_mismatch_is_absent() {
        let draft = json!({"list": [1, 2], "obj": {"0": "zero"}});
        assert_eq!(get(&draft, &JsonPath::from_field("list").push_field("0")), None);
        assert_eq!(get(&draft, &JsonPath::from_field("obj").push_index(0)), None);
        assert_eq!(get(&draft, &p(&["list", "5"])), None);
        assert_eq!(get(&draft, &p(&["list", "1"])), Some(&json!(2)));
    }

    #[test]
    fn test_set_preserves_siblings() {
        let draft = json!({"name": {"first": "Ada", "last": "L"}, "age": 36});
        let next = set(&draft, &p(&["name", "last"]), Some(json!("Lovelace"))).unwrap();
        assert_eq!(
            next,
            json!({"name": {"first": "Ada", "last": "Lovelace"}, "age": 36})
        );
        // The input is untouched
        assert_eq!(draft["name"]["last"], json!("L"));
    }

    #[test]
    fn test_set_creates_containers_by_next_segment() {
        let next = set(&json!({}), &p(&["a", "0", "b"]), Some(json!(true))).unwrap();
        assert_eq!(next, json!({"a": [{"b": true}]}));
    }

    #[test]
    fn test_set_replaces_null_intermediate() {
        let next = set(&json!({"a": null}), &p(&["a", "b"]), Some(json!(1))).unwrap();
        assert_eq!(next, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_set_none_removes_key() {
        let next = set(&json!({"a": 1, "b": 2}), &p(&["a"]), None).unwrap();
        assert_eq!(next, json!({"b": 2}));
    }

    #[test]
    fn test_set_none_in_array_stores_null() {
        let next = set(&json!({"xs": [1, 2]}), &p(&["xs", "0"]), None).unwrap();
        assert_eq!(next, json!({"xs": [null, 2]}));

        // Clearing past the end leaves the array alone
        let next = set(&json!({"xs": [1]}), &p(&["xs", "4"]), None).unwrap();
        assert_eq!(next, json!({"xs": [1]}));
    }

    #[test]
    fn test_set_pads_arrays() {
        let next = set(&json!({"xs": []}), &p(&["xs", "2"]), Some(json!("c"))).unwrap();
        assert_eq!(next, json!({"xs": [null, null, "c"]}));
    }

    #[test]
    fn test_set_rejects_index_beyond_padding_limit() {
        let xs = JsonPath::from_field("xs");
        for idx in [usize::MAX, MAX_ARRAY_PADDING + 1] {
            assert_eq!(
                set(&json!({"xs": []}), &xs.push_index(idx), Some(json!(1))),
                Err(DeepPathError::IndexOutOfRange {
                    path: xs.clone(),
                    index: idx,
                    len: 0,
                })
            );
        }
        // intermediate slots are bounded the same way
        assert!(matches!(
            set(&json!({}), &xs.push_index(usize::MAX).push_field("name"), Some(json!(1))),
            Err(DeepPathError::IndexOutOfRange { index: usize::MAX, .. })
        ));

        let next = set(&json!({"xs": []}), &xs.push_index(MAX_ARRAY_PADDING), Some(json!(1)))
            .unwrap();
        assert_eq!(next["xs"].as_array().map(Vec::len), Some(MAX_ARRAY_PADDING + 1));
    }

    #[test]
    fn test_set_empty_path_fails() {
        assert_eq!(
            set(&json!({}), &JsonPath::root(), Some(json!(1))),
            Err(DeepPathError::EmptyPath)
        );
    }

    #[test]
    fn test_set_through_primitive_fails() {
        let err = set(&json!({"a": 5}), &p(&["a", "b"]), Some(json!(1))).unwrap_err();
        assert_eq!(
            err,
            DeepPathError::TraversePrimitive {
                path: JsonPath::from_field("a"),
                found: "number",
            }
        );
    }

    #[test]
    fn test_set_kind_mismatch_fails() {
        let err = set(&json!({"xs": [1]}), &p(&["xs", "name"]), Some(json!(1))).unwrap_err();
        assert!(matches!(err, DeepPathError::KindMismatch { expected: "object", found: "array", .. }));

        let err = set(&json!({"obj": {}}), &p(&["obj", "0"]), Some(json!(1))).unwrap_err();
        assert!(matches!(err, DeepPathError::KindMismatch { expected: "array", found: "object", .. }));
    }

    #[test]
    fn test_equal_ignores_key_order() {
        let a = json!({"x": 1, "y": [1, {"z": "q"}]});
        let b = json!({"y": [1, {"z": "q"}], "x": 1});
        assert!(equal(&a, &b));
        assert!(equal(&b, &a));
    }

    #[test]
    fn test_equal_numbers_by_value() {
        assert!(equal(&json!(1), &json!(1.0)));
        assert!(!equal(&json!(1), &json!(1.5)));
        assert!(!equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_equal_dates_by_instant() {
        assert!(equal(
            &json!("2024-01-01T00:00:00Z"),
            &json!("2024-01-01T01:00:00+01:00")
        ));
        assert!(!equal(
            &json!("2024-01-01T00:00:00Z"),
            &json!("2024-01-02T00:00:00Z")
        ));
        assert!(!equal(&json!("a"), &json!("b")));
    }

    #[test]
    fn test_equal_mismatched_shapes() {
        assert!(!equal(&json!([]), &json!({})));
        assert!(!equal(&json!({"a": 1}), &json!(1)));
        assert!(!equal(&json!([1, 2]), &json!([1])));
        assert!(!equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!equal(&json!(null), &json!(false)));
    }

    #[test]
    fn test_equal_opt() {
        assert!(equal_opt(None, None));
        assert!(!equal_opt(Some(&json!(1)), None));
        assert!(equal_opt(Some(&json!(1)), Some(&json!(1.0))));
    }

    #[test]
    fn test_path_starts_with_ignores_kind() {
        let issue = JsonPath::from_field("flowers").push_index(0);
        assert!(path_starts_with(&issue, &p(&["flowers"])));
        assert!(path_starts_with(&issue, &JsonPath::from_field("flowers").push_field("0")));
        assert!(!path_starts_with(&issue, &p(&["flowers", "1"])));
    }
}
