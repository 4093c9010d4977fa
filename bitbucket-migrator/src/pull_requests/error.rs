//! Pull request migration error types.

use crate::github::ApiFailure;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that abort the run during pull request migration.
#[derive(Debug, Error)]
pub enum PrError {
    /// Opening a pull request failed for a non-skippable reason.
    #[error("Failed to create PR for Bitbucket PR #{pr_id}: {source}")]
    CreatePullRequest {
        pr_id: u64,
        #[source]
        source: ApiFailure,
    },

    /// Creating the issue for a merged pull request failed.
    #[error("Failed to create issue for Bitbucket PR #{pr_id}: {source}")]
    CreateIssue {
        pr_id: u64,
        #[source]
        source: ApiFailure,
    },

    /// Commenting on the merge commit failed.
    #[error("Failed to comment on commit {sha}: {source}")]
    CommitComment {
        sha: String,
        #[source]
        source: ApiFailure,
    },

    /// Closing the issue failed.
    #[error("Failed to close issue #{issue_number}: {source}")]
    CloseIssue {
        issue_number: u64,
        #[source]
        source: ApiFailure,
    },

    /// A merged record had no merge commit.
    #[error("Bitbucket PR #{pr_id} has no merge commit")]
    MissingMergeCommit { pr_id: u64 },

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    Template(#[from] TemplateError),
}
