//! One-line rendering of a field's issues.

use std::fmt;
use std::sync::Arc;

use super::SchemaError;

/// Maps an issue to the text shown for it.
pub type IssueMap = Arc<dyn Fn(&SchemaError) -> String + Send + Sync>;

/// How [`summarize`] renders a list of issues.
///
/// ```rust
/// use formwork::{summarize, JsonPath, SchemaError, SummaryOptions};
///
/// let issues = vec![
///     SchemaError::new(JsonPath::from_field("age"), "too small").with_code("min_value"),
///     SchemaError::new(JsonPath::from_field("age"), "not a multiple of 2"),
/// ];
///
/// assert_eq!(
///     summarize(&issues, &SummaryOptions::new()).as_deref(),
///     Some("too small, not a multiple of 2")
/// );
///
/// let options = SummaryOptions::new()
///     .max(1)
///     .issue_map(|issue| format!("{} ({})", issue.message, issue.code));
/// assert_eq!(summarize(&issues, &options).as_deref(), Some("too small (min_value)"));
/// ```
#[derive(Clone)]
pub struct SummaryOptions {
    max: Option<usize>,
    separator: String,
    issue_map: Option<IssueMap>,
}

impl SummaryOptions {
    /// All issues, messages only, separated by `", "`.
    pub fn new() -> Self {
        Self {
            max: None,
            separator: ", ".to_string(),
            issue_map: None,
        }
    }

    /// Shows at most `max` issues.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the text placed between issues.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Replaces the default `issue.message` rendering.
    pub fn issue_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&SchemaError) -> String + Send + Sync + 'static,
    {
        self.issue_map = Some(Arc::new(map));
        self
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SummaryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryOptions")
            .field("max", &self.max)
            .field("separator", &self.separator)
            .field("issue_map", &self.issue_map.is_some())
            .finish()
    }
}

/// Renders `issues` as one string, or `None` when there are none.
pub fn summarize(issues: &[SchemaError], options: &SummaryOptions) -> Option<String> {
    if issues.is_empty() {
        return None;
    }

    let limit = options.max.unwrap_or(issues.len());
    let rendered: Vec<String> = issues
        .iter()
        .take(limit)
        .map(|issue| match &options.issue_map {
            Some(map) => map(issue),
            None => issue.message.clone(),
        })
        .collect();

    Some(rendered.join(&options.separator))
}
