//! Per-repository outcome.

use crate::permissions::RevokedPermissions;
use crate::pull_requests::PassSummary;
use serde::Serialize;
use std::fmt;

/// Optional pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Downgrade source permissions.
    RevokePermissions,
    /// Mirror git contents.
    Contents,
    /// Settings, topics and custom properties.
    Settings,
    /// Open pull request pass.
    OpenPullRequests,
    /// Merged pull request pass.
    ClosedPullRequests,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RevokePermissions => "revoke permissions",
            Self::Contents => "contents",
            Self::Settings => "settings",
            Self::OpenPullRequests => "open PRs",
            Self::ClosedPullRequests => "closed PRs",
        })
    }
}

/// Result of migrating a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryOutcome {
    /// Destination full name (`owner/name`).
    pub repository: String,
    /// Permission entries downgraded, when the stage ran.
    pub revoked: Option<RevokedPermissions>,
    /// Whether contents were pushed.
    pub contents_pushed: bool,
    /// Open pull request pass, when it ran.
    pub open_prs: Option<PassSummary>,
    /// Merged pull request pass, when it ran.
    pub merged_prs: Option<PassSummary>,
    /// Stages disabled by configuration.
    pub skipped_stages: Vec<Stage>,
}

impl RepositoryOutcome {
    /// Creates an outcome with nothing recorded yet.
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            revoked: None,
            contents_pushed: false,
            open_prs: None,
            merged_prs: None,
            skipped_stages: Vec::new(),
        }
    }
}
