//! Destination repository descriptor.

use crate::bitbucket::SourceRepository;
use crate::config::{MigrationConfig, Owner};

/// Topic attached to every migrated repository.
pub const MIGRATION_TOPIC: &str = "migrated-from-bitbucket";

/// An organization custom property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProperty {
    /// Property name, defined at organization level.
    pub name: String,
    /// Value for this repository.
    pub value: String,
}

/// The GitHub repository a Bitbucket repository is migrated into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRepository {
    /// User or organization owning the repository.
    pub owner: Owner,
    /// Repository name; the Bitbucket slug.
    pub name: String,
    /// `public`, or the configured visibility for private sources.
    pub visibility: String,
    /// Description copied from Bitbucket.
    pub description: String,
    /// Default branch copied from Bitbucket's main branch.
    pub default_branch: String,
    /// Language reported by Bitbucket. GitHub computes its own, so this is informational.
    pub language: String,
    /// Topics applied once contents exist.
    pub topics: Vec<String>,
    /// Custom property values applied when the owner is an organization.
    pub custom_properties: Vec<CustomProperty>,
}

impl DestinationRepository {
    /// Returns `owner/name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login(), self.name)
    }
}

/// Lower-cases and replaces spaces with `-` so a project name is a valid topic.
#[must_use]
pub fn clean_topic(input: &str) -> String {
    input.to_lowercase().replace(' ', "-")
}

/// Builds the descriptor for a source repository. Pure; no network effect.
#[must_use]
pub fn build_descriptor(source: &SourceRepository, config: &MigrationConfig) -> DestinationRepository {
    let visibility = if source.is_private {
        config.private_visibility.clone()
    } else {
        "public".to_string()
    };
    let project_topic = clean_topic(&source.project_name);

    DestinationRepository {
        owner: config.github.owner.clone(),
        name: source.slug.clone(),
        visibility,
        description: source.description.clone(),
        default_branch: source.main_branch.clone(),
        language: source.language.clone(),
        topics: vec![MIGRATION_TOPIC.to_string(), project_topic.clone()],
        custom_properties: vec![
            CustomProperty {
                name: "bitbucket".to_string(),
                value: "true".to_string(),
            },
            CustomProperty {
                name: "project".to_string(),
                value: project_topic,
            },
        ],
    }
}
