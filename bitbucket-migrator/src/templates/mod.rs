//! Text synthesis for migrated pull requests.
//!
//! Titles are plain formats; bodies are rendered with Handlebars.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

use crate::records::PullRequestRecord;

/// Label attached to issues that stand in for merged pull requests.
pub const MERGED_PR_LABEL: &str = "bitbucket-pr";

/// Artifacts of Bitbucket's rich-text renderer that have no meaning on GitHub.
const SUMMARY_ARTIFACTS: &[&str] = &["{: data-inline-card='' }", "\u{200c}"];

/// Generates the title used for both recreated pull requests and issues.
///
/// Format: "Historical Bitbucket PR #{id}: {title}"
#[must_use]
pub fn generate_pr_title(record: &PullRequestRecord) -> String {
    format!("Historical Bitbucket PR #{}: {}", record.id, record.title)
}

/// Strips Bitbucket markup artifacts from a pull request description.
#[must_use]
pub fn sanitize_summary(summary: &str) -> String {
    SUMMARY_ARTIFACTS
        .iter()
        .fold(summary.to_string(), |text, artifact| text.replace(artifact, ""))
}
