//! Normalized failure from a GitHub API call.

use serde_json::Value;
use std::fmt;

/// A failed call to the destination API, reduced to the parts that the
/// classifier and the logs need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Top-level error message.
    pub message: String,
    /// Per-field validation errors, rendered as `{resource:.. field:.. code:.. message:..}`.
    pub details: Vec<String>,
}

impl ApiFailure {
    /// Creates a failure without validation details.
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Adds a rendered validation detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Converts an octocrab error, keeping GitHub's validation errors.
    pub(crate) fn from_octocrab(error: &octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => Self {
                status: Some(source.status_code.as_u16()),
                message: source.message.clone(),
                details: source
                    .errors
                    .as_ref()
                    .map(|errors| errors.iter().map(render_detail).collect())
                    .unwrap_or_default(),
            },
            other => Self::new(None, other.to_string()),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "{status} ")?;
        }
        f.write_str(&self.message)?;
        if !self.details.is_empty() {
            write!(f, " [{}]", self.details.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiFailure {}

/// Renders one entry of GitHub's `errors` array.
fn render_detail(value: &Value) -> String {
    let Some(object) = value.as_object() else {
        return value.as_str().map_or_else(|| value.to_string(), str::to_string);
    };

    let parts: Vec<String> = ["resource", "field", "code", "message"]
        .iter()
        .filter_map(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .map(|v| format!("{key}:{v}"))
        })
        .collect();

    format!("{{{}}}", parts.join(" "))
}
