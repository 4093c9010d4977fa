//! Template renderer.

use crate::records::PullRequestRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::{no_escape, Handlebars};
use serde_json::{json, Value};

/// Body of a recreated open pull request.
const OPEN_PR_BODY: &str = "PR originally created by {{author}} on {{created_on}}. \
Migrated from Bitbucket on {{migrated_on}}\n\n---\n{{summary}}";

/// Body of the closed issue standing in for a merged pull request.
const MERGED_ISSUE_BODY: &str = "**Bitbucket PR created from branch {{branch}} on {{created_on}} \
by {{author}}. Merged by {{merged_by}}{{#if merged_on}} on {{merged_on}}{{/if}}**\n\n---\n{{summary}}";

/// Comment left on the merge commit.
const COMMIT_COMMENT: &str = "Bitbucket PR details: #{{issue_number}}";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}

/// Renders the bodies written to GitHub.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the body of a recreated open pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_open_pr_body(
        &self,
        record: &PullRequestRecord,
        migrated_at: DateTime<Utc>,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "author": record.author.display_name,
            "created_on": record.created_on.to_rfc3339_opts(SecondsFormat::Secs, true),
            "migrated_on": migrated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "summary": super::sanitize_summary(&record.summary),
        });

        self.render_template(OPEN_PR_BODY, &data)
    }

    /// Renders the body of the issue recording a merged pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_merged_issue_body(
        &self,
        record: &PullRequestRecord,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "branch": record.source.name,
            "created_on": record.created_on.format("%Y-%m-%d %H:%M:%S").to_string(),
            "author": record.author.display_name,
            "merged_by": record.closed_by.as_ref().map_or("", |p| p.display_name.as_str()),
            "merged_on": record
                .merged_on
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            "summary": super::sanitize_summary(&record.summary),
        });

        self.render_template(MERGED_ISSUE_BODY, &data)
    }

    /// Renders the merge-commit comment pointing at the issue.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_commit_comment(&self, issue_number: u64) -> Result<String, super::TemplateError> {
        self.render_template(COMMIT_COMMENT, &json!({ "issue_number": issue_number }))
    }

    /// Renders a template with the given data.
    fn render_template(&self, template: &str, data: &Value) -> Result<String, super::TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
