//! Replicator error types.

use crate::github::ApiFailure;
use thiserror::Error;

/// Errors that abort the run while replicating a repository.
#[derive(Debug, Error)]
pub enum ReplicatorError {
    /// The repository exists and overwriting is disabled.
    #[error("Refusing to overwrite existing GitHub repository {name}")]
    RefusingToOverwrite { name: String },

    /// Creation failed for a reason other than the repository existing.
    #[error("Failed to create repository {name}: {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: ApiFailure,
    },

    /// The repository never became readable.
    #[error("Repository {name} still not visible after {attempts} attempts")]
    NeverVisible { name: String, attempts: u32 },

    /// Reading the repository failed for a reason other than it not existing yet.
    #[error("Failed to read repository {name}: {source}")]
    ProbeFailed {
        name: String,
        #[source]
        source: ApiFailure,
    },

    /// A settings, topics or custom property update failed.
    #[error("Failed to update {operation} for repository {name}: {source}")]
    UpdateFailed {
        operation: &'static str,
        name: String,
        #[source]
        source: ApiFailure,
    },
}
