//! Bitbucket API error types.

use thiserror::Error;

/// Errors that can occur while talking to Bitbucket.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport or HTTP client error.
    #[error("Bitbucket request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bitbucket answered with an error status.
    #[error("Bitbucket API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A response was missing a field we rely on.
    #[error("Bitbucket response for '{context}' is missing '{field}'")]
    MissingField {
        context: String,
        field: &'static str,
    },

    /// A response could not be decoded.
    #[error("Failed to decode Bitbucket response for '{context}': {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A URL could not be built.
    #[error("Invalid Bitbucket URL: {0}")]
    Url(#[from] url::ParseError),
}
