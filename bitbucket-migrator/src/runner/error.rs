//! Runner error types.

/// Errors that abort a migration run.
///
/// Any of these stops the whole batch, not only the current repository.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Bitbucket API errors.
    #[error(transparent)]
    Source(#[from] crate::bitbucket::SourceError),

    /// Malformed pull request listings.
    #[error(transparent)]
    Decode(#[from] crate::records::DecodeError),

    /// Destination repository creation or settings errors.
    #[error(transparent)]
    Replicator(#[from] crate::repository::ReplicatorError),

    /// Pull request migration errors.
    #[error(transparent)]
    PullRequest(#[from] crate::pull_requests::PrError),

    /// Git clone or push errors.
    #[error(transparent)]
    Transfer(#[from] crate::transfer::TransferError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),
}
