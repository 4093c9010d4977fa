//! Source platform access (Bitbucket Cloud).
//!
//! The [`SourceApi`] trait is the seam the orchestrator talks through;
//! [`BitbucketClient`] is the HTTP implementation.

mod client;
mod error;
mod models;

pub use client::BitbucketClient;
pub use error::SourceError;
pub use models::{GroupPermission, Permission, SourceRepository, UserPermission};

use async_trait::async_trait;
use serde_json::Value;

/// Operations the migration needs from the source platform.
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Fetches repository metadata.
    async fn repository(&self, slug: &str) -> Result<SourceRepository, SourceError>;

    /// Lists explicit user permissions.
    async fn user_permissions(&self, slug: &str) -> Result<Vec<UserPermission>, SourceError>;

    /// Lists explicit group permissions.
    async fn group_permissions(&self, slug: &str) -> Result<Vec<GroupPermission>, SourceError>;

    /// Sets a user's permission level.
    async fn set_user_permission(
        &self,
        slug: &str,
        account_id: &str,
        permission: Permission,
    ) -> Result<(), SourceError>;

    /// Sets a group's permission level.
    async fn set_group_permission(
        &self,
        slug: &str,
        group_slug: &str,
        permission: Permission,
    ) -> Result<(), SourceError>;

    /// Lists open and merged pull requests targeting `destination_branch`.
    ///
    /// Returns the undecoded envelope (`{"values": [...]}`) or an
    /// error-shaped payload; decoding is left to
    /// [`decode_pull_requests`](crate::records::decode_pull_requests).
    async fn pull_requests(&self, slug: &str, destination_branch: &str)
        -> Result<Value, SourceError>;
}
