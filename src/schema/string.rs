//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating string values with
//! constraints like minimum/maximum length, regex patterns, and the common
//! email and url formats.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;

use super::traits::{finish, type_error, LeafKind, SchemaLike, Shape};

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$";
const URL_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(URL_PATTERN).expect("url pattern compiles"))
}

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        pattern_str: String,
        message: Option<String>,
    },
    Email {
        message: Option<String>,
    },
    Url {
        message: Option<String>,
    },
}

/// A schema for validating string values.
///
/// `StringSchema` validates that values are strings and optionally applies
/// constraints. All constraint violations are accumulated rather than
/// short-circuiting on the first failure.
///
/// # Example
///
/// ```rust
/// use formwork::{JsonPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::string()
///     .min_len(3)
///     .max_len(20)
///     .pattern(r"^[a-z]+$")
///     .unwrap();
///
/// // Reports both: too short AND pattern mismatch
/// let result = schema.validate(&json!("AB"), &JsonPath::root());
/// assert_eq!(result.into_result().unwrap_err().len(), 2);
/// ```
#[derive(Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    trim: bool,
    type_error_message: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            trim: false,
            type_error_message: None,
        }
    }

    /// Trims surrounding whitespace before checking constraints.
    ///
    /// The trimmed string is the validated output.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Adds a minimum length constraint.
    ///
    /// The string must have at least `min` characters (Unicode scalar values).
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().min_len(1);
    ///
    /// assert!(schema.validate(&json!("j"), &JsonPath::root()).is_success());
    /// assert!(schema.validate(&json!(""), &JsonPath::root()).is_failure());
    /// ```
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    /// Adds a maximum length constraint.
    ///
    /// Counts characters, not bytes, so a short name in any script fits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let nickname = Schema::string().max_len(4);
    ///
    /// assert!(nickname.validate(&json!("Zoë"), &JsonPath::root()).is_success());
    ///
    /// let errors = nickname
    ///     .validate(&json!("Zoltan"), &JsonPath::from_field("nickname"))
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().code, "max_length");
    /// assert_eq!(errors.first().path.name(), "nickname");
    /// ```
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// Adds a regex pattern constraint.
    ///
    /// The pattern is unanchored; add `^` and `$` to match the whole input.
    /// Returns an error if the regex pattern is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let postcode = Schema::string().pattern(r"^\d{4}-\d{3}$").unwrap();
    ///
    /// assert!(postcode.validate(&json!("1000-001"), &JsonPath::root()).is_success());
    /// assert!(postcode.validate(&json!("1000 001"), &JsonPath::root()).is_failure());
    /// assert!(Schema::string().pattern("(unclosed").is_err());
    /// ```
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            pattern_str: pattern.to_string(),
            message: None,
        });
        Ok(self)
    }

    /// Requires an email address.
    pub fn email(mut self) -> Self {
        self.constraints
            .push(StringConstraint::Email { message: None });
        self
    }

    /// Requires an absolute url with a scheme and a host.
    ///
    /// ```rust
    /// use formwork::{JsonPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string().url();
    ///
    /// assert!(schema.validate(&json!("https://example.com/docs"), &JsonPath::root()).is_success());
    /// assert!(schema.validate(&json!("example dot com"), &JsonPath::root()).is_failure());
    /// ```
    pub fn url(mut self) -> Self {
        self.constraints.push(StringConstraint::Url { message: None });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when the value is not a string).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                StringConstraint::MinLength { message: m, .. }
                | StringConstraint::MaxLength { message: m, .. }
                | StringConstraint::Pattern { message: m, .. }
                | StringConstraint::Email { message: m }
                | StringConstraint::Url { message: m } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value against this schema.
    ///
    /// Returns `Validation::Success` with the validated string if all
    /// constraints pass, or `Validation::Failure` with all accumulated
    /// errors if any constraints fail.
    pub fn validate(&self, value: &Value, path: &JsonPath) -> Validation<String, SchemaErrors> {
        let s = match value.as_str() {
            Some(s) if self.trim => s.trim(),
            Some(s) => s,
            None => {
                return Validation::Failure(type_error(
                    path,
                    self.type_error_message.as_ref(),
                    "expected string",
                    "string",
                    value,
                ));
            }
        };

        let errors: Vec<SchemaError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();

        finish(s.to_string(), errors)
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &JsonPath) -> Validation<Self::Output, SchemaErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &JsonPath) -> Validation<Value, SchemaErrors> {
        self.validate(value, path).map(Value::String)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(LeafKind::String)
    }
}

fn check_constraint(
    constraint: &StringConstraint,
    value: &str,
    path: &JsonPath,
) -> Option<SchemaError> {
    let len = value.chars().count();
    match constraint {
        StringConstraint::MinLength { min, message } if len < *min => {
            let msg = message.clone().unwrap_or_else(|| {
                format!("length must be at least {}, got {}", min, len)
            });
            Some(
                SchemaError::new(path.clone(), msg)
                    .with_code("min_length")
                    .with_expected(format!("at least {} characters", min))
                    .with_got(format!("{} characters", len)),
            )
        }
        StringConstraint::MaxLength { max, message } if len > *max => {
            let msg = message.clone().unwrap_or_else(|| {
                format!("length must be at most {}, got {}", max, len)
            });
            Some(
                SchemaError::new(path.clone(), msg)
                    .with_code("max_length")
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len)),
            )
        }
        StringConstraint::Pattern {
            regex,
            pattern_str,
            message,
        } if !regex.is_match(value) => {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must match pattern '{}'", pattern_str));
            Some(
                SchemaError::new(path.clone(), msg)
                    .with_code("pattern")
                    .with_expected(format!("string matching '{}'", pattern_str))
                    .with_got(value.to_string()),
            )
        }
        StringConstraint::Email { message } if !email_regex().is_match(value) => {
            let msg = message.clone().unwrap_or_else(|| "invalid email".to_string());
            Some(
                SchemaError::new(path.clone(), msg)
                    .with_code("invalid_email")
                    .with_expected("email address")
                    .with_got(value.to_string()),
            )
        }
        StringConstraint::Url { message } if !url_regex().is_match(value) => {
            let msg = message.clone().unwrap_or_else(|| "invalid url".to_string());
            Some(
                SchemaError::new(path.clone(), msg)
                    .with_code("invalid_url")
                    .with_expected("url")
                    .with_got(value.to_string()),
            )
        }
        _ => None,
    }
}
