//! Async validation support.
//!
//! A form runs its schema synchronously and then every registered
//! [`AsyncValidator`] in order. Issues from both stages are stored together.

pub mod async_validator;

pub use async_validator::{async_validator, AsyncValidator, FnValidator};
