//! Destination platform access (GitHub).
//!
//! The [`DestinationApi`] trait is the seam the replicator and the pull
//! request migrator talk through; [`GitHubClient`] is the octocrab
//! implementation. Every failure is reported as an [`ApiFailure`] so it can
//! be run through [`classify`](crate::classify::classify).

mod client;
mod failure;

pub use client::GitHubClient;
pub use failure::ApiFailure;

use crate::repository::{CustomProperty, DestinationRepository};
use async_trait::async_trait;

/// A pull request to open on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Branch holding the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
    /// Open as a draft.
    pub draft: bool,
}

/// An issue to open on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Labels to attach.
    pub labels: Vec<String>,
}

/// Operations the migration needs from the destination platform.
#[async_trait]
pub trait DestinationApi: Send + Sync {
    /// Creates the repository under its owner.
    async fn create_repository(&self, repository: &DestinationRepository)
        -> Result<(), ApiFailure>;

    /// Reads the repository; succeeds once it is visible.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<(), ApiFailure>;

    /// Overwrites description, default branch and visibility.
    async fn edit_repository(&self, repository: &DestinationRepository) -> Result<(), ApiFailure>;

    /// Replaces the full topic set.
    async fn replace_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &[String],
    ) -> Result<(), ApiFailure>;

    /// Creates or updates organization custom property values.
    async fn update_custom_properties(
        &self,
        organization: &str,
        name: &str,
        properties: &[CustomProperty],
    ) -> Result<(), ApiFailure>;

    /// Opens a pull request and returns its number.
    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pull_request: &NewPullRequest,
    ) -> Result<u64, ApiFailure>;

    /// Opens an issue and returns its number.
    async fn create_issue(&self, owner: &str, name: &str, issue: &NewIssue)
        -> Result<u64, ApiFailure>;

    /// Closes an issue.
    async fn close_issue(&self, owner: &str, name: &str, number: u64) -> Result<(), ApiFailure>;

    /// Comments on a commit.
    async fn create_commit_comment(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
        body: &str,
    ) -> Result<(), ApiFailure>;
}
