//! The host's input elements as the form sees them.
//!
//! The form never owns a UI. It talks to whatever the host renders through
//! [`InputElement`], receives user input as [`ChangeEvent`]s and keeps an
//! [`ElementRegistry`] so that programmatic draft changes can be pushed back
//! onto attached elements.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::path::JsonPath;

/// What kind of control an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A single-line text input (text, number, date and similar).
    Text,
    /// A multi-line text input.
    TextArea,
    /// A drop-down choice.
    Select,
    /// A checkbox; its value is its checked state.
    Checkbox,
    /// One option of a radio group sharing a field name.
    Radio,
}

/// A host element bound to a form field.
///
/// Implementations use interior mutability: the form holds elements behind
/// `Arc` and writes to them from whichever thread changed the draft.
pub trait InputElement: Send + Sync {
    /// The control kind.
    fn kind(&self) -> ElementKind;

    /// The element's current value attribute. For radios and checkboxes this
    /// is the option value, not the checked state.
    fn value(&self) -> String;

    /// Whether a checkbox or radio is checked.
    fn checked(&self) -> bool;

    /// Shows `value` in the element.
    fn set_value(&self, value: &str);

    /// Checks or unchecks a checkbox or radio.
    fn set_checked(&self, checked: bool);
}

/// Raw input coming from an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The kind of element that fired.
    pub kind: ElementKind,
    /// The element's value attribute at the time of the event.
    pub value: String,
    /// The element's checked flag at the time of the event.
    pub checked: bool,
}

impl ChangeEvent {
    /// Input from a text-like element.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Text,
            value: value.into(),
            checked: false,
        }
    }

    /// A checkbox toggled to `checked`.
    pub fn checkbox(checked: bool) -> Self {
        Self {
            kind: ElementKind::Checkbox,
            value: String::new(),
            checked,
        }
    }

    /// A radio option `value` changing to `checked`.
    pub fn radio(value: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: ElementKind::Radio,
            value: value.into(),
            checked,
        }
    }

    /// Reads the current state of `element`.
    pub fn from_element(element: &dyn InputElement) -> Self {
        Self {
            kind: element.kind(),
            value: element.value(),
            checked: element.checked(),
        }
    }
}

/// An attached element and the draft location it shows.
#[derive(Clone)]
pub struct BoundElement {
    /// Draft location.
    pub path: JsonPath,
    /// The host element.
    pub element: Arc<dyn InputElement>,
}

impl fmt::Debug for BoundElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundElement")
            .field("path", &self.path)
            .field("kind", &self.element.kind())
            .finish()
    }
}

/// Attached elements keyed by field name, or `name.value` for radio options.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    elements: IndexMap<String, BoundElement>,
}

impl ElementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `element` under `key`, replacing any element already there.
    pub fn insert(&mut self, key: String, path: JsonPath, element: Arc<dyn InputElement>) {
        self.elements.insert(key, BoundElement { path, element });
    }

    /// Detaches the element under `key`.
    pub fn remove(&mut self, key: &str) -> Option<BoundElement> {
        self.elements.shift_remove(key)
    }

    /// The element under `key`.
    pub fn get(&self, key: &str) -> Option<&BoundElement> {
        self.elements.get(key)
    }

    /// Keys in attachment order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Number of attached elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Clones out every attached element, so reflection can run unlocked.
    pub fn snapshot(&self) -> Vec<BoundElement> {
        self.elements.values().cloned().collect()
    }
}

/// Renders a draft value the way a text control shows it.
///
/// Absent and `null` show as empty, strings as themselves, anything else as
/// JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Pushes `value` onto `element`'s visual state.
pub(crate) fn reflect(element: &dyn InputElement, value: Option<&Value>) {
    match element.kind() {
        ElementKind::Checkbox => {
            let own = element.value();
            let checked = match value {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => !own.is_empty() && *s == own,
                Some(Value::Array(items)) => {
                    items.iter().any(|item| item.as_str() == Some(own.as_str()))
                }
                _ => false,
            };
            element.set_checked(checked);
        }
        ElementKind::Radio => {
            element.set_checked(value.is_some() && display_value(value) == element.value());
        }
        ElementKind::Text | ElementKind::TextArea | ElementKind::Select => {
            element.set_value(&display_value(value));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeElement;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None), "");
        assert_eq!(display_value(Some(&Value::Null)), "");
        assert_eq!(display_value(Some(&json!("rose"))), "rose");
        assert_eq!(display_value(Some(&json!(18))), "18");
        assert_eq!(display_value(Some(&json!(true))), "true");
    }

    #[test]
    fn test_reflect_text() {
        let input = FakeElement::new(ElementKind::Text, "");
        reflect(&*input, Some(&json!(42)));
        assert_eq!(input.value(), "42");
        reflect(&*input, None);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_reflect_checkbox() {
        let plain = FakeElement::new(ElementKind::Checkbox, "");
        reflect(&*plain, Some(&json!(true)));
        assert!(plain.checked());
        reflect(&*plain, Some(&json!(false)));
        assert!(!plain.checked());

        let tagged = FakeElement::new(ElementKind::Checkbox, "rose");
        reflect(&*tagged, Some(&json!(["tulip", "rose"])));
        assert!(tagged.checked());
        reflect(&*tagged, Some(&json!("tulip")));
        assert!(!tagged.checked());
    }

    #[test]
    fn test_reflect_radio_matches_by_value() {
        let red = FakeElement::new(ElementKind::Radio, "red");
        let green = FakeElement::new(ElementKind::Radio, "green");
        for element in [&red, &green] {
            reflect(&**element, Some(&json!("green")));
        }
        assert!(!red.checked());
        assert!(green.checked());
        // the value attribute of a radio is never overwritten
        assert_eq!(green.value(), "green");
    }

    #[test]
    fn test_registry_keeps_attachment_order() {
        let mut registry = ElementRegistry::new();
        let element: Arc<dyn InputElement> = FakeElement::new(ElementKind::Text, "");
        registry.insert("b".into(), JsonPath::from_field("b"), element.clone());
        registry.insert("a".into(), JsonPath::from_field("a"), element.clone());
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["b", "a"]);

        assert!(registry.remove("b").is_some());
        assert!(registry.remove("b").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_change_event_from_element() {
        let element = FakeElement::new(ElementKind::Radio, "blue");
        element.set_checked(true);
        assert_eq!(
            ChangeEvent::from_element(&*element),
            ChangeEvent::radio("blue", true)
        );
    }
}
