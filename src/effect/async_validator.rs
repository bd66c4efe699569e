//! Validators that need to suspend.
//!
//! Some checks cannot be answered from the draft alone: whether a username is
//! taken, whether a coupon code exists. An [`AsyncValidator`] runs after the
//! form's schema has accepted the draft and sees the parsed value. Its issues
//! are path-tagged like schema issues and land in the same error set.
//!
//! Environment dependencies (a database handle, an HTTP client) are captured
//! by the validator itself rather than threaded through the form.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use stillwater::Validation;

use crate::error::SchemaErrors;
use crate::path::JsonPath;

/// A validation step that may suspend.
///
/// Implementations must be `Send + Sync` so a form can hand its validation
/// run to a spawner.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use formwork::{AsyncValidator, JsonPath, SchemaError, SchemaErrors};
/// use serde_json::Value;
/// use stillwater::Validation;
///
/// struct NotAdmin;
///
/// #[async_trait]
/// impl AsyncValidator for NotAdmin {
///     async fn validate(&self, value: &Value, path: &JsonPath) -> Validation<(), SchemaErrors> {
///         if value["name"] == "admin" {
///             let at = path.push_field("name");
///             Validation::Failure(SchemaErrors::single(
///                 SchemaError::new(at, "name is reserved").with_code("reserved"),
///             ))
///         } else {
///             Validation::Success(())
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncValidator: Send + Sync {
    /// Checks the parsed form value. `path` is the root the value sits at.
    async fn validate(&self, value: &Value, path: &JsonPath) -> Validation<(), SchemaErrors>;
}

/// An [`AsyncValidator`] backed by a closure returning a future.
pub struct FnValidator<F, Fut> {
    check: F,
    _future: PhantomData<fn() -> Fut>,
}

/// Wraps `check` as an [`AsyncValidator`].
///
/// The closure receives owned copies of the value and path so the future it
/// returns can be `'static`.
///
/// ```rust
/// use formwork::{async_validator, AsyncValidator, JsonPath, SchemaError, SchemaErrors};
/// use serde_json::json;
/// use stillwater::Validation;
///
/// let even = async_validator(|value, path| async move {
///     match value["n"].as_i64() {
///         Some(n) if n % 2 == 0 => Validation::Success(()),
///         _ => Validation::Failure(SchemaErrors::single(SchemaError::new(
///             path.push_field("n"),
///             "must be even",
///         ))),
///     }
/// });
///
/// let result = futures::executor::block_on(even.validate(&json!({"n": 3}), &JsonPath::root()));
/// assert!(result.is_failure());
/// ```
pub fn async_validator<F, Fut>(check: F) -> FnValidator<F, Fut>
where
    F: Fn(Value, JsonPath) -> Fut + Send + Sync,
    Fut: Future<Output = Validation<(), SchemaErrors>> + Send,
{
    FnValidator {
        check,
        _future: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> AsyncValidator for FnValidator<F, Fut>
where
    F: Fn(Value, JsonPath) -> Fut + Send + Sync,
    Fut: Future<Output = Validation<(), SchemaErrors>> + Send,
{
    async fn validate(&self, value: &Value, path: &JsonPath) -> Validation<(), SchemaErrors> {
        (self.check)(value.clone(), path.clone()).await
    }
}

/// Runs every validator against `value` in order and accumulates their issues.
pub(crate) async fn run_all(
    validators: &[Box<dyn AsyncValidator>],
    value: &Value,
    path: &JsonPath,
) -> Validation<(), SchemaErrors> {
    let mut all_errors = Vec::new();
    for validator in validators {
        if let Validation::Failure(errors) = validator.validate(value, path).await {
            all_errors.extend(errors);
        }
    }
    match SchemaErrors::try_from_vec(all_errors) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(()),
    }
}
