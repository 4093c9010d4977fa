//! Pull request history migration.
//!
//! Open pull requests are recreated as GitHub pull requests. GitHub can't
//! create a pull request that is already merged, so merged ones become a
//! closed issue linked from a comment on the merge commit.

mod error;
mod status;

pub use error::PrError;
pub use status::{PassSummary, PrStatus};

use crate::classify::{classify, ErrorClass};
use crate::github::{DestinationApi, NewIssue, NewPullRequest};
use crate::pacing::Pacer;
use crate::records::{PrState, PullRequestRecord};
use crate::repository::DestinationRepository;
use crate::templates::{generate_pr_title, TemplateRenderer, MERGED_PR_LABEL};
use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};

/// Migrates pull request records into one destination repository.
pub struct PullRequestMigrator<'a> {
    api: &'a dyn DestinationApi,
    repository: &'a DestinationRepository,
    renderer: &'a TemplateRenderer,
    pacer: &'a Pacer,
    dry_run: bool,
    migrated_at: DateTime<Utc>,
}

impl<'a> PullRequestMigrator<'a> {
    /// Creates a migrator. `migrated_at` is stamped into every body.
    #[must_use]
    pub fn new(
        api: &'a dyn DestinationApi,
        repository: &'a DestinationRepository,
        renderer: &'a TemplateRenderer,
        pacer: &'a Pacer,
        dry_run: bool,
        migrated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            api,
            repository,
            renderer,
            pacer,
            dry_run,
            migrated_at,
        }
    }

    /// Recreates every open record as a pull request, in record order.
    ///
    /// A pull request that already exists, or whose source branch is gone,
    /// is skipped and the pass continues.
    ///
    /// # Errors
    ///
    /// Returns [`PrError`] on the first non-skippable failure.
    pub async fn migrate_open(&self, records: &[PullRequestRecord]) -> Result<PassSummary, PrError> {
        let span = info_span!("migrate_open_prs", repo = %self.repository.full_name());

        async {
            let mut summary = PassSummary::default();
            for record in records.iter().filter(|r| r.state == PrState::Open) {
                let status = self.migrate_open_record(record).await?;
                summary.record(&status);
            }
            info!(
                created = summary.created,
                skipped = summary.skipped,
                previewed = summary.previewed,
                "Open PR migration finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn migrate_open_record(&self, record: &PullRequestRecord) -> Result<PrStatus, PrError> {
        let pull_request = NewPullRequest {
            title: generate_pr_title(record),
            body: self.renderer.render_open_pr_body(record, self.migrated_at)?,
            head: record.source.name.clone(),
            base: self.repository.default_branch.clone(),
            draft: record.draft,
        };

        if self.dry_run {
            info!(pr_id = record.id, title = %pull_request.title, head = %pull_request.head, "Dry run: would create PR");
            return Ok(PrStatus::Previewed);
        }

        let result = self
            .api
            .create_pull_request(
                self.repository.owner.login(),
                &self.repository.name,
                &pull_request,
            )
            .await;

        let status = match result {
            Ok(number) => {
                info!(pr_id = record.id, pr_number = number, "Migrated PR");
                PrStatus::Created { number }
            }
            Err(failure) => {
                let classification = classify(&failure);
                if classification.class != ErrorClass::Skippable {
                    return Err(PrError::CreatePullRequest {
                        pr_id: record.id,
                        source: failure,
                    });
                }
                warn!(
                    pr_id = record.id,
                    head = %pull_request.head,
                    reason = classification.reason,
                    "Skipping PR"
                );
                PrStatus::Skipped {
                    reason: classification.reason.to_string(),
                }
            }
        };

        self.pacer.after_mutation().await;
        Ok(status)
    }

    /// Records every merged pull request as a closed issue linked from its
    /// merge commit.
    ///
    /// # Errors
    ///
    /// Returns [`PrError`] on any failure; this pass never skips.
    pub async fn migrate_merged(
        &self,
        records: &[PullRequestRecord],
    ) -> Result<PassSummary, PrError> {
        let span = info_span!("migrate_merged_prs", repo = %self.repository.full_name());

        async {
            let mut summary = PassSummary::default();
            for record in records.iter().filter(|r| r.state == PrState::Merged) {
                let status = self.migrate_merged_record(record).await?;
                summary.record(&status);
            }
            info!(
                recorded = summary.recorded,
                previewed = summary.previewed,
                "Merged PR migration finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn migrate_merged_record(&self, record: &PullRequestRecord) -> Result<PrStatus, PrError> {
        let sha = record
            .merge_commit
            .as_deref()
            .ok_or(PrError::MissingMergeCommit { pr_id: record.id })?;
        let issue = NewIssue {
            title: generate_pr_title(record),
            body: self.renderer.render_merged_issue_body(record)?,
            labels: vec![MERGED_PR_LABEL.to_string()],
        };

        if self.dry_run {
            info!(pr_id = record.id, title = %issue.title, commit = sha, "Dry run: would record merged PR");
            return Ok(PrStatus::Previewed);
        }

        let owner = self.repository.owner.login();
        let name = self.repository.name.as_str();

        let issue_number = self
            .api
            .create_issue(owner, name, &issue)
            .await
            .map_err(|source| PrError::CreateIssue {
                pr_id: record.id,
                source,
            })?;
        self.pacer.after_mutation().await;

        let comment = self.renderer.render_commit_comment(issue_number)?;
        self.api
            .create_commit_comment(owner, name, sha, &comment)
            .await
            .map_err(|source| PrError::CommitComment {
                sha: sha.to_string(),
                source,
            })?;
        self.pacer.after_mutation().await;

        // Issues can't be created closed.
        self.api
            .close_issue(owner, name, issue_number)
            .await
            .map_err(|source| PrError::CloseIssue {
                issue_number,
                source,
            })?;

        self.pacer.after_mutation().await;

        info!(pr_id = record.id, issue_number, "Recorded merged PR");
        Ok(PrStatus::Recorded { issue_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ApiFailure;
    use crate::pacing::MUTATION_DELAY;
    use crate::repository::build_descriptor;
    use crate::testing::{
        merged_record, missing_head_failure, open_record, pr_exists_failure, recording_pacer,
        sample_config, sample_source, FakeDestination,
    };
    use chrono::TimeZone;

    fn migrated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn records() -> Vec<PullRequestRecord> {
        vec![open_record(1), merged_record(2), open_record(3), merged_record(4)]
    }

    #[tokio::test]
    async fn open_pass_creates_prs_in_order() {
        let destination = FakeDestination::default();
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, sleeper) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());

        let summary = migrator.migrate_open(&records()).await.unwrap();

        assert_eq!(summary.created, 2);
        assert_eq!(
            destination.calls(),
            vec![
                "create_pull_request acme/widgets feature/1",
                "create_pull_request acme/widgets feature/3",
            ]
        );
        let created = destination.pull_requests();
        assert_eq!(created[0].title, "Historical Bitbucket PR #1: Change 1");
        assert_eq!(created[0].base, "main");
        assert!(created[0].body.contains("Migrated from Bitbucket on 2024-01-02T03:04:05Z"));
        assert_eq!(sleeper.recorded(), vec![MUTATION_DELAY, MUTATION_DELAY]);
    }

    #[tokio::test]
    async fn open_pass_preserves_draft_flag() {
        let destination = FakeDestination::default();
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, _) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());
        let mut draft = open_record(5);
        draft.draft = true;

        migrator.migrate_open(&[draft]).await.unwrap();

        assert!(destination.pull_requests()[0].draft);
    }

    #[tokio::test]
    async fn skippable_failures_do_not_stop_the_pass() {
        let destination = FakeDestination::default();
        destination.fail_next("create_pull_request", pr_exists_failure());
        destination.fail_next("create_pull_request", missing_head_failure());
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, _) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());

        let summary = migrator
            .migrate_open(&[open_record(1), open_record(2), open_record(3)])
            .await
            .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.created, 1);
        assert_eq!(destination.calls().len(), 3);
    }

    #[tokio::test]
    async fn fatal_failure_aborts_open_pass() {
        let destination = FakeDestination::default();
        destination.fail_next("create_pull_request", ApiFailure::new(Some(500), "Server Error"));
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, _) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());

        let result = migrator.migrate_open(&[open_record(1), open_record(2)]).await;

        assert!(matches!(result, Err(PrError::CreatePullRequest { pr_id: 1, .. })));
        assert_eq!(destination.calls().len(), 1);
    }

    #[tokio::test]
    async fn merged_pass_creates_comments_and_closes_issue() {
        let destination = FakeDestination::default();
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, sleeper) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());

        let summary = migrator.migrate_merged(&records()).await.unwrap();

        // One pause after each of the three writes per record.
        assert_eq!(sleeper.recorded(), vec![MUTATION_DELAY; 6]);

        assert_eq!(summary.recorded, 2);
        assert_eq!(
            destination.calls(),
            vec![
                "create_issue acme/widgets",
                "create_commit_comment acme/widgets abc2",
                "close_issue acme/widgets #100",
                "create_issue acme/widgets",
                "create_commit_comment acme/widgets abc4",
                "close_issue acme/widgets #101",
            ]
        );
        assert_eq!(destination.comments()[0], "Bitbucket PR details: #100");
        let issues = destination.issues();
        assert_eq!(issues[0].labels, vec!["bitbucket-pr".to_string()]);
        assert_eq!(issues[0].title, "Historical Bitbucket PR #2: Change 2");
    }

    #[tokio::test]
    async fn merged_pass_has_no_skip_condition() {
        let destination = FakeDestination::default();
        destination.fail_next("create_commit_comment", pr_exists_failure());
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, _) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, false, migrated_at());

        let result = migrator.migrate_merged(&records()).await;

        assert!(matches!(result, Err(PrError::CommitComment { .. })));
    }

    #[tokio::test]
    async fn dry_run_previews_every_record_without_calls() {
        let destination = FakeDestination::default();
        let repository = build_descriptor(&sample_source(), &sample_config());
        let renderer = TemplateRenderer::new();
        let (pacer, sleeper) = recording_pacer();
        let migrator =
            PullRequestMigrator::new(&destination, &repository, &renderer, &pacer, true, migrated_at());

        let open = migrator.migrate_open(&records()).await.unwrap();
        let merged = migrator.migrate_merged(&records()).await.unwrap();

        assert_eq!(open.previewed, 2);
        assert_eq!(merged.previewed, 2);
        assert!(destination.calls().is_empty());
        assert!(sleeper.recorded().is_empty());
    }
}
