//! The frozen migration configuration.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Public Bitbucket Cloud API root.
pub const DEFAULT_BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Visibility applied to private source repositories unless overridden.
pub const DEFAULT_PRIVATE_VISIBILITY: &str = "internal";

/// Owner of the destination repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// A personal GitHub account.
    User(String),
    /// A GitHub organization.
    Organization(String),
}

impl Owner {
    /// Resolves the owner from the mutually exclusive user/organization settings.
    ///
    /// Empty strings are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousOwner`] unless exactly one is set.
    pub fn from_parts(user: Option<String>, organization: Option<String>) -> Result<Self, ConfigError> {
        let user = user.filter(|u| !u.trim().is_empty());
        let organization = organization.filter(|o| !o.trim().is_empty());

        match (user, organization) {
            (Some(user), None) => Ok(Self::User(user)),
            (None, Some(org)) => Ok(Self::Organization(org)),
            _ => Err(ConfigError::AmbiguousOwner),
        }
    }

    /// Returns the login of the owner, used in repository paths.
    #[must_use]
    pub fn login(&self) -> &str {
        match self {
            Self::User(login) | Self::Organization(login) => login,
        }
    }

    /// Returns the organization name, if the owner is an organization.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        match self {
            Self::Organization(org) => Some(org),
            Self::User(_) => None,
        }
    }
}

/// Protocol used to clone the source repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneProtocol {
    /// `git@bitbucket.org:<workspace>/<slug>.git`
    Ssh,
    /// `https://bitbucket.org/<workspace>/<slug>.git`
    #[default]
    Https,
}

impl CloneProtocol {
    /// Parses the `CLONE_VIA` setting. Only `ssh` (any case) selects SSH.
    #[must_use]
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("ssh") {
            Self::Ssh
        } else {
            Self::Https
        }
    }
}

/// Independently enabled pipeline stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageToggles {
    /// Mirror the git contents (all refs) to the destination.
    pub contents: bool,
    /// Apply settings, topics and custom properties.
    pub settings: bool,
    /// Recreate open pull requests.
    pub open_prs: bool,
    /// Recreate merged pull requests as closed issues.
    pub closed_prs: bool,
    /// Downgrade every source permission entry to read-only.
    pub revoke_permissions: bool,
}

impl StageToggles {
    /// Returns true if either pull request pass runs.
    #[must_use]
    pub fn any_prs(&self) -> bool {
        self.open_prs || self.closed_prs
    }
}

/// Bitbucket connection settings.
#[derive(Debug, Clone)]
pub struct BitbucketSettings {
    /// Workspace that owns the source repositories.
    pub workspace: String,
    /// Username for basic authentication.
    pub username: String,
    /// App password or API token.
    pub password: String,
    /// API root, overridable for tests.
    pub api_url: String,
}

/// GitHub connection settings.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// Personal access token.
    pub token: String,
    /// Destination owner.
    pub owner: Owner,
    /// API root override; `None` uses the public GitHub API.
    pub api_url: Option<String>,
}

/// Configuration for a migration run.
///
/// Built once at startup and shared by reference with every stage.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Source platform settings.
    pub bitbucket: BitbucketSettings,
    /// Destination platform settings.
    pub github: GitHubSettings,
    /// Preview without mutating either platform.
    pub dry_run: bool,
    /// Push into a destination repository that already exists.
    pub overwrite: bool,
    /// Visibility given to repositories that are private on Bitbucket.
    pub private_visibility: String,
    /// Protocol used to clone from Bitbucket.
    pub clone_protocol: CloneProtocol,
    /// Program run in the mirror checkout before pushing.
    pub post_clone_program: Option<PathBuf>,
    /// Enabled stages.
    pub stages: StageToggles,
}

impl MigrationConfig {
    /// Checks that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("BITBUCKET_WORKSPACE", &self.bitbucket.workspace),
            ("BITBUCKET_USER", &self.bitbucket.username),
            ("BITBUCKET_TOKEN", &self.bitbucket.password),
            ("GITHUB_TOKEN", &self.github.token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingSetting { name });
            }
        }

        if self.private_visibility.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                name: "GITHUB_PRIVATE_VISIBILITY",
                message: "must not be empty".to_string(),
            });
        }

        url::Url::parse(&self.bitbucket.api_url).map_err(|e| ConfigError::ValidationError {
            name: "BITBUCKET_API_URL",
            message: e.to_string(),
        })?;

        if let Some(api_url) = &self.github.api_url {
            url::Url::parse(api_url).map_err(|e| ConfigError::ValidationError {
                name: "GITHUB_API_URL",
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}
