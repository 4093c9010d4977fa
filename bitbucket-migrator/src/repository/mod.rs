//! Destination repository creation and settings.
//!
//! Repository creation on GitHub is asynchronous, so after creating a
//! repository the [`Replicator`] polls until it can be read back. Settings,
//! topics and custom properties are plain overwrites and can be applied any
//! number of times; topics need the repository to have contents first.

mod descriptor;
mod error;

pub use descriptor::{
    build_descriptor, clean_topic, CustomProperty, DestinationRepository, MIGRATION_TOPIC,
};
pub use error::ReplicatorError;

use crate::bitbucket::SourceRepository;
use crate::classify::{classify, ErrorClass};
use crate::config::MigrationConfig;
use crate::github::DestinationApi;
use crate::pacing::Pacer;
use tracing::{debug, info, warn};

/// Creates and configures destination repositories.
pub struct Replicator<'a> {
    api: &'a dyn DestinationApi,
    config: &'a MigrationConfig,
    pacer: &'a Pacer,
}

impl<'a> Replicator<'a> {
    /// Creates a replicator.
    #[must_use]
    pub fn new(api: &'a dyn DestinationApi, config: &'a MigrationConfig, pacer: &'a Pacer) -> Self {
        Self { api, config, pacer }
    }

    /// Builds the descriptor and, unless in dry-run, creates the repository and
    /// waits until it is visible.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicatorError`] if the repository exists and overwrite is
    /// disabled, if creation fails otherwise, or if it never becomes visible.
    pub async fn create_or_locate(
        &self,
        source: &SourceRepository,
    ) -> Result<DestinationRepository, ReplicatorError> {
        let repository = build_descriptor(source, self.config);

        if self.config.dry_run {
            info!(repo = %repository.full_name(), "Dry run: would create repository");
            return Ok(repository);
        }

        info!(repo = %repository.full_name(), visibility = %repository.visibility, "Creating repository");
        if let Err(failure) = self.api.create_repository(&repository).await {
            let classification = classify(&failure);
            match classification.class {
                ErrorClass::Skippable if self.config.overwrite => {
                    warn!(
                        repo = %repository.full_name(),
                        reason = classification.reason,
                        "Repository exists, overwriting"
                    );
                }
                ErrorClass::Skippable => {
                    return Err(ReplicatorError::RefusingToOverwrite {
                        name: repository.full_name(),
                    });
                }
                ErrorClass::Retryable | ErrorClass::Fatal => {
                    return Err(ReplicatorError::CreateFailed {
                        name: repository.full_name(),
                        source: failure,
                    });
                }
            }
        }

        self.wait_until_visible(&repository).await?;
        Ok(repository)
    }

    /// Polls until the repository can be read, within the probe budget.
    async fn wait_until_visible(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ReplicatorError> {
        let attempts = self.pacer.timings().probe_attempts;

        for attempt in 1..=attempts {
            self.pacer.before_probe().await;
            match self
                .api
                .get_repository(repository.owner.login(), &repository.name)
                .await
            {
                Ok(()) => {
                    info!(repo = %repository.full_name(), attempt, "Repository is available");
                    return Ok(());
                }
                Err(failure) if classify(&failure).class == ErrorClass::Retryable => {
                    debug!(repo = %repository.full_name(), attempt, "Waiting for repository to become available");
                }
                Err(failure) => {
                    return Err(ReplicatorError::ProbeFailed {
                        name: repository.full_name(),
                        source: failure,
                    });
                }
            }
            self.pacer.after_failed_probe().await;
        }

        Err(ReplicatorError::NeverVisible {
            name: repository.full_name(),
            attempts,
        })
    }

    /// Overwrites description, default branch and visibility.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicatorError::UpdateFailed`] if GitHub rejects the edit.
    pub async fn update_settings(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ReplicatorError> {
        if self.config.dry_run {
            info!(repo = %repository.full_name(), "Dry run: would update repository settings");
            return Ok(());
        }

        info!(repo = %repository.full_name(), branch = %repository.default_branch, "Updating repository settings");
        self.api
            .edit_repository(repository)
            .await
            .map_err(|source| ReplicatorError::UpdateFailed {
                operation: "settings",
                name: repository.full_name(),
                source,
            })?;
        self.pacer.after_mutation().await;
        Ok(())
    }

    /// Replaces the topic set. Call only after contents were pushed.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicatorError::UpdateFailed`] if GitHub rejects the topics.
    pub async fn update_topics(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ReplicatorError> {
        if self.config.dry_run {
            info!(repo = %repository.full_name(), topics = ?repository.topics, "Dry run: would update topics");
            return Ok(());
        }

        info!(repo = %repository.full_name(), topics = ?repository.topics, "Updating topics");
        self.api
            .replace_topics(repository.owner.login(), &repository.name, &repository.topics)
            .await
            .map_err(|source| ReplicatorError::UpdateFailed {
                operation: "topics",
                name: repository.full_name(),
                source,
            })?;
        self.pacer.after_mutation().await;
        Ok(())
    }

    /// Sets the custom property values. A no-op for user-owned repositories.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicatorError::UpdateFailed`] if GitHub rejects the values.
    pub async fn update_custom_properties(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ReplicatorError> {
        let Some(organization) = repository.owner.organization() else {
            debug!(repo = %repository.full_name(), "Custom properties need an organization, skipping");
            return Ok(());
        };

        if self.config.dry_run {
            info!(repo = %repository.full_name(), "Dry run: would update custom properties");
            return Ok(());
        }

        info!(repo = %repository.full_name(), "Updating custom properties");
        self.api
            .update_custom_properties(organization, &repository.name, &repository.custom_properties)
            .await
            .map_err(|source| ReplicatorError::UpdateFailed {
                operation: "custom properties",
                name: repository.full_name(),
                source,
            })?;
        self.pacer.after_mutation().await;
        Ok(())
    }
}
