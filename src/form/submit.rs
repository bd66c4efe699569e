//! Submit events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::Form;

/// A host submit event.
///
/// The handler returned by [`Form::handle_submit`] marks the event; the host
/// reads the flags back and suppresses its own default handling.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl SubmitEvent {
    /// A fresh, unmarked event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses the host's default submission.
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::Relaxed);
    }

    /// Stops the event from reaching enclosing forms.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::Relaxed);
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was called.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::Relaxed)
    }
}

impl Form {
    /// Returns a reusable submit handler for the host's form element.
    ///
    /// Each call marks the event, validates and passes the parsed value to
    /// `handler` when the draft is valid. The run goes through the
    /// configured spawner, or completes before the call returns when there is
    /// none. A call made from inside an executor whose run is still waiting on
    /// an async validator is queued until the next validation or submit.
    ///
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use formwork::{Form, Schema, SubmitEvent};
    /// use serde_json::json;
    ///
    /// let form = Form::new(Schema::object().field("name", Schema::string().min_len(1)));
    /// let received = Arc::new(Mutex::new(None));
    /// let sink = received.clone();
    /// let on_submit = form.handle_submit(move |value| *sink.lock().unwrap() = Some(value));
    ///
    /// let event = SubmitEvent::new();
    /// on_submit(&event);
    /// assert!(event.default_prevented());
    /// assert!(received.lock().unwrap().is_none());
    ///
    /// form.fields().field("name").unwrap().set_value(json!("john")).unwrap();
    /// on_submit(&SubmitEvent::new());
    /// assert_eq!(*received.lock().unwrap(), Some(json!({"name": "john"})));
    /// ```
    pub fn handle_submit<H>(&self, handler: H) -> impl Fn(&SubmitEvent) + Send + Sync + 'static
    where
        H: Fn(Value) + Send + Sync + 'static,
    {
        let form = self.clone();
        let handler = Arc::new(handler);
        move |event: &SubmitEvent| {
            event.prevent_default();
            event.stop_propagation();
            let handler = Arc::clone(&handler);
            let submission = form.submit(move |value| handler(value));
            form.dispatch(Box::pin(async move {
                submission.await;
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_flags() {
        let event = SubmitEvent::new();
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }
}
