//! Bitbucket repository and permission models.

use serde::{Deserialize, Serialize};

/// Snapshot of a source repository, fetched once per migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRepository {
    /// Repository slug.
    pub slug: String,
    /// Whether the repository is private.
    pub is_private: bool,
    /// Free-form description.
    pub description: String,
    /// Main branch name.
    pub main_branch: String,
    /// Primary language, possibly empty.
    pub language: String,
    /// Name of the owning project.
    pub project_name: String,
}

/// Permission level on a Bitbucket repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only.
    Read,
    /// Push access.
    Write,
    /// Administration.
    Admin,
    /// Any level this tool doesn't know about.
    #[serde(other)]
    Other,
}

/// A user's explicit permission on a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermission {
    /// Atlassian account id, used to address the permission entry.
    pub account_id: String,
    /// Display name, for logs.
    pub display_name: String,
    /// Current level.
    pub permission: Permission,
}

/// A group's explicit permission on a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPermission {
    /// Group slug, used to address the permission entry.
    pub group_slug: String,
    /// Current level.
    pub permission: Permission,
}

/// Raw repository payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepository {
    pub slug: String,
    pub is_private: bool,
    #[serde(default)]
    pub description: String,
    pub mainbranch: Option<ApiNamed>,
    #[serde(default)]
    pub language: String,
    pub project: Option<ApiNamed>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUserPermission {
    pub permission: Permission,
    pub user: ApiUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGroupPermission {
    pub permission: Permission,
    pub group: ApiGroup,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGroup {
    pub slug: String,
}

impl From<ApiUserPermission> for UserPermission {
    fn from(api: ApiUserPermission) -> Self {
        Self {
            account_id: api.user.account_id,
            display_name: api.user.display_name,
            permission: api.permission,
        }
    }
}

impl From<ApiGroupPermission> for GroupPermission {
    fn from(api: ApiGroupPermission) -> Self {
        Self {
            group_slug: api.group.slug,
            permission: api.permission,
        }
    }
}
