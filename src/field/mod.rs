//! The field chain and element bindings.
//!
//! [`Field`] navigates the schema and reads or writes the draft at one
//! location. [`Registration`] binds a location to host input elements, and
//! [`Controlled`] serves widgets that manage their own input.

mod chain;
mod controlled;
mod element;
mod register;

pub use chain::Field;
pub use controlled::Controlled;
pub use element::{display_value, BoundElement, ChangeEvent, ElementKind, ElementRegistry, InputElement};
pub use register::{ChangeHook, RegisterOptions, Registration};

pub(crate) use element::reflect;
