//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while assembling the migration configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required setting was empty.
    #[error("Missing required setting: {name}")]
    MissingSetting { name: &'static str },

    /// Neither or both of the GitHub user and organization were given.
    #[error("You must set either a GitHub organization or a GitHub user, but not both")]
    AmbiguousOwner,

    /// Validation error in a setting value.
    #[error("Invalid value for '{name}': {message}")]
    ValidationError { name: &'static str, message: String },
}
