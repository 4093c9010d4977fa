//! Record decoding error types.

use thiserror::Error;

/// Errors produced while decoding the pull request listing.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload was not a JSON object.
    #[error("pull request listing is not a mapping")]
    NotAMapping,

    /// Bitbucket returned an error object instead of data.
    #[error("Bitbucket reported an error: {message}")]
    Backend { message: String },

    /// A required field was absent.
    #[error("pull request {id} is missing '{field}'")]
    MissingField { id: String, field: &'static str },

    /// A record didn't match the expected shape.
    #[error("pull request at index {index} could not be decoded: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
