//! Typed pull request records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Pull request states the migration understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    /// Still open on Bitbucket.
    Open,
    /// Merged on Bitbucket.
    Merged,
}

impl PrState {
    /// Parses a Bitbucket state. Any other state yields `None`.
    #[must_use]
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "OPEN" => Some(Self::Open),
            "MERGED" => Some(Self::Merged),
            _ => None,
        }
    }
}

/// A user reference. Only `display_name` is read; other keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    /// Name shown in the Bitbucket UI.
    pub display_name: String,
}

/// A pull request endpoint. Only `branch.name` is read; other keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name.
    pub name: String,
}

impl<'de> Deserialize<'de> for BranchRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Endpoint {
            branch: Branch,
        }

        #[derive(Deserialize)]
        struct Branch {
            name: String,
        }

        let endpoint = Endpoint::deserialize(deserializer)?;
        Ok(Self {
            name: endpoint.branch.name,
        })
    }
}

/// A normalized, immutable view of a Bitbucket pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// Bitbucket pull request id.
    pub id: u64,
    /// Original title.
    pub title: String,
    /// Open or merged.
    pub state: PrState,
    /// Original author.
    pub author: Participant,
    /// Branch the changes came from.
    pub source: BranchRef,
    /// Branch the changes targeted.
    pub destination: BranchRef,
    /// When the pull request was opened.
    pub created_on: DateTime<Utc>,
    /// When the pull request was merged. Set for merged records only.
    pub merged_on: Option<DateTime<Utc>>,
    /// Raw markdown description.
    pub summary: String,
    /// Merge commit hash. Set for merged records only.
    pub merge_commit: Option<String>,
    /// Who merged it. Set for merged records only.
    pub closed_by: Option<Participant>,
    /// Whether the pull request is a draft.
    pub draft: bool,
}

/// Raw pull request payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub id: u64,
    pub title: String,
    pub author: Participant,
    pub source: BranchRef,
    pub destination: BranchRef,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_on: DateTime<Utc>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_option")]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<ApiText>,
    #[serde(default)]
    pub merge_commit: Option<ApiCommit>,
    #[serde(default)]
    pub closed_by: Option<Participant>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiText {
    #[serde(default)]
    pub raw: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    pub hash: String,
}
