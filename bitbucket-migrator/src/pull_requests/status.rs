//! Per-record migration outcomes.

use serde::Serialize;

/// Outcome of migrating one pull request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrStatus {
    /// A pull request was opened.
    Created {
        /// GitHub PR number.
        number: u64,
    },

    /// A closed issue was created and linked from the merge commit.
    Recorded {
        /// GitHub issue number.
        issue_number: u64,
    },

    /// The desired state already existed.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Dry run; nothing was sent.
    Previewed,
}

/// Tally of one pass over the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Pull requests opened.
    pub created: usize,
    /// Issues recorded for merged pull requests.
    pub recorded: usize,
    /// Records skipped because the target already existed.
    pub skipped: usize,
    /// Records previewed in dry-run.
    pub previewed: usize,
}

impl PassSummary {
    /// Counts a record outcome.
    pub fn record(&mut self, status: &PrStatus) {
        match status {
            PrStatus::Created { .. } => self.created += 1,
            PrStatus::Recorded { .. } => self.recorded += 1,
            PrStatus::Skipped { .. } => self.skipped += 1,
            PrStatus::Previewed => self.previewed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_outcome() {
        let mut summary = PassSummary::default();
        summary.record(&PrStatus::Created { number: 1 });
        summary.record(&PrStatus::Recorded { issue_number: 2 });
        summary.record(&PrStatus::Skipped {
            reason: "exists".to_string(),
        });
        summary.record(&PrStatus::Previewed);
        summary.record(&PrStatus::Previewed);

        assert_eq!(
            summary,
            PassSummary {
                created: 1,
                recorded: 1,
                skipped: 1,
                previewed: 2,
            }
        );
    }
}
