//! Run summary types.

use super::result::RepositoryOutcome;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of repositories that went through the whole pipeline.
    pub repositories_migrated: usize,

    /// Number of pull requests opened.
    pub prs_created: usize,

    /// Number of pull requests skipped because they already existed or
    /// their source branch is gone.
    pub prs_skipped: usize,

    /// Number of closed issues recorded for merged pull requests.
    pub issues_created: usize,

    /// Number of records previewed in dry-run.
    pub records_previewed: usize,

    /// Number of stages skipped by configuration, over all repositories.
    pub stages_skipped: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a repository outcome.
    pub fn record_outcome(&mut self, outcome: &RepositoryOutcome) {
        self.repositories_migrated += 1;
        self.stages_skipped += outcome.skipped_stages.len();

        for pass in [&outcome.open_prs, &outcome.merged_prs].into_iter().flatten() {
            self.prs_created += pass.created;
            self.prs_skipped += pass.skipped;
            self.issues_created += pass.recorded;
            self.records_previewed += pass.previewed;
        }
    }
}
