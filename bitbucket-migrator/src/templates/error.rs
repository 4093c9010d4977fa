//! Template rendering error types.

/// Failure to synthesise a pull request or issue body.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A body template referenced a field the record didn't provide.
    #[error("Failed to render body: {0}")]
    Render(#[from] handlebars::RenderError),
}
