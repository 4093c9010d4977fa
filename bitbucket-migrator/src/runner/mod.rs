//! Orchestrates the per-repository migration pipeline.
//!
//! For every repository the stages run strictly in this order:
//!
//! 1. fetch source metadata
//! 2. revoke source write access
//! 3. mirror-clone the contents
//! 4. fetch the pull request listing
//! 5. create or locate the destination repository
//! 6. add the destination remote and push
//! 7. settings, topics and custom properties
//! 8. open pull requests
//! 9. merged pull requests
//!
//! Optional stages are toggled by [`StageToggles`](crate::config::StageToggles).
//! The first error aborts the whole run.

mod error;

pub use error::RunnerError;

use crate::bitbucket::{BitbucketClient, SourceApi};
use crate::config::MigrationConfig;
use crate::github::{DestinationApi, GitHubClient};
use crate::pacing::Pacer;
use crate::permissions::revoke_write_access;
use crate::pull_requests::PullRequestMigrator;
use crate::records::{decode_pull_requests, PullRequestRecord};
use crate::repository::Replicator;
use crate::summary::{RepositoryOutcome, RunSummary, Stage};
use crate::templates::TemplateRenderer;
use crate::transfer::{ContentTransport, GitTransport};
use chrono::Utc;
use tracing::{info, info_span, Instrument};

/// Runs the migration stages against the given collaborators.
pub struct Pipeline<'a> {
    source: &'a dyn SourceApi,
    destination: &'a dyn DestinationApi,
    transport: &'a dyn ContentTransport,
    config: &'a MigrationConfig,
    pacer: &'a Pacer,
    renderer: &'a TemplateRenderer,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        source: &'a dyn SourceApi,
        destination: &'a dyn DestinationApi,
        transport: &'a dyn ContentTransport,
        config: &'a MigrationConfig,
        pacer: &'a Pacer,
        renderer: &'a TemplateRenderer,
    ) -> Self {
        Self {
            source,
            destination,
            transport,
            config,
            pacer,
            renderer,
        }
    }

    /// Migrates every repository in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] raised by any stage.
    pub async fn run(&self, slugs: &[String]) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run);

        for (index, slug) in slugs.iter().enumerate() {
            let span = info_span!("migrate_repository", repo = %slug);
            info!(parent: &span, position = index + 1, total = slugs.len(), "Migrating repository");

            let outcome = self.migrate_repository(slug).instrument(span).await?;
            summary.record_outcome(&outcome);

            self.pacer.between_repositories().await;
        }

        Ok(summary)
    }

    /// Runs every enabled stage for one repository.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] raised by any stage.
    pub async fn migrate_repository(&self, slug: &str) -> Result<RepositoryOutcome, RunnerError> {
        let stages = self.config.stages;
        let source_repository = self.source.repository(slug).await?;
        let mut skipped = Vec::new();

        let revoked = if stages.revoke_permissions {
            Some(revoke_write_access(self.source, slug, self.config.dry_run, self.pacer).await?)
        } else {
            skip(&mut skipped, Stage::RevokePermissions);
            None
        };

        let checkout = if stages.contents {
            Some(self.transport.clone_mirror(slug).await?)
        } else {
            skip(&mut skipped, Stage::Contents);
            None
        };

        let records = if stages.any_prs() {
            self.fetch_pull_requests(slug, &source_repository.main_branch)
                .await?
        } else {
            Vec::new()
        };

        let replicator = Replicator::new(self.destination, self.config, self.pacer);
        let repository = replicator.create_or_locate(&source_repository).await?;

        let mut outcome = RepositoryOutcome::new(repository.full_name());
        outcome.revoked = revoked;

        if let Some(checkout) = &checkout {
            self.transport.prepare_push(checkout, &repository).await?;
            if self.config.dry_run {
                info!(repo = %repository.full_name(), "Dry run: would push mirror");
            } else {
                self.transport.push_mirror(checkout).await?;
                outcome.contents_pushed = true;
            }
        }

        if stages.settings {
            replicator.update_settings(&repository).await?;
            replicator.update_topics(&repository).await?;
            replicator.update_custom_properties(&repository).await?;
        } else {
            skip(&mut skipped, Stage::Settings);
        }

        let migrator = PullRequestMigrator::new(
            self.destination,
            &repository,
            self.renderer,
            self.pacer,
            self.config.dry_run,
            Utc::now(),
        );

        if stages.open_prs {
            outcome.open_prs = Some(migrator.migrate_open(&records).await?);
        } else {
            skip(&mut skipped, Stage::OpenPullRequests);
        }

        if stages.closed_prs {
            outcome.merged_prs = Some(migrator.migrate_merged(&records).await?);
        } else {
            skip(&mut skipped, Stage::ClosedPullRequests);
        }

        outcome.skipped_stages = skipped;
        info!(repo = %outcome.repository, "Repository migrated");
        Ok(outcome)
    }

    async fn fetch_pull_requests(
        &self,
        slug: &str,
        main_branch: &str,
    ) -> Result<Vec<PullRequestRecord>, RunnerError> {
        let listing = self.source.pull_requests(slug, main_branch).await?;
        let records = decode_pull_requests(&listing)?;
        info!(repo = slug, count = records.len(), "Fetched pull requests");
        Ok(records)
    }
}

fn skip(skipped: &mut Vec<Stage>, stage: Stage) {
    info!(stage = %stage, "Stage disabled, skipping");
    skipped.push(stage);
}

/// Runs a migration against the real Bitbucket, GitHub and git.
pub struct Runner {
    config: MigrationConfig,
    source: BitbucketClient,
    destination: GitHubClient,
    transport: GitTransport,
    pacer: Pacer,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the configuration is invalid or a client
    /// can't be built.
    pub fn new(config: MigrationConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        let source = BitbucketClient::new(&config.bitbucket)?;
        let destination = GitHubClient::from_settings(&config.github)?;
        let transport = GitTransport::new(&config);

        Ok(Self {
            config,
            source,
            destination,
            transport,
            pacer: Pacer::default(),
            renderer: TemplateRenderer::new(),
        })
    }

    /// Migrates the given repositories.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] raised by any stage.
    pub async fn run(&self, slugs: &[String]) -> Result<RunSummary, RunnerError> {
        if self.config.dry_run {
            info!("Dry run: no changes will be made");
        }
        info!(count = slugs.len(), owner = %self.config.github.owner.login(), "Starting migration");

        Pipeline::new(
            &self.source,
            &self.destination,
            &self.transport,
            &self.config,
            &self.pacer,
            &self.renderer,
        )
        .run(slugs)
        .await
    }
}
