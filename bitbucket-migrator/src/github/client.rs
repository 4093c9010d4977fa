//! Octocrab-backed GitHub client.

use super::{ApiFailure, DestinationApi, NewIssue, NewPullRequest};
use crate::config::GitHubSettings;
use crate::repository::{CustomProperty, DestinationRepository};
use async_trait::async_trait;
use octocrab::models::IssueState;
use octocrab::Octocrab;
use serde_json::{json, Value};
use tracing::debug;

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Wraps an existing octocrab client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an authenticated client, honouring an API base override.
    ///
    /// # Errors
    ///
    /// Returns an octocrab error if the base URI is invalid or the client
    /// can't be built.
    pub fn from_settings(settings: &GitHubSettings) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().personal_token(settings.token.clone());
        if let Some(api_url) = &settings.api_url {
            builder = builder.base_uri(api_url.as_str())?;
        }
        Ok(Self::new(builder.build()?))
    }
}

fn failure(error: &octocrab::Error) -> ApiFailure {
    ApiFailure::from_octocrab(error)
}

/// Body shared by repository creation and edits.
fn repository_body(repository: &DestinationRepository) -> Value {
    json!({
        "name": repository.name,
        "description": repository.description,
        "visibility": repository.visibility,
    })
}

#[async_trait]
impl DestinationApi for GitHubClient {
    async fn create_repository(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ApiFailure> {
        let route = match repository.owner.organization() {
            Some(org) => format!("/orgs/{org}/repos"),
            None => "/user/repos".to_string(),
        };
        debug!(%route, name = %repository.name, "Creating repository");

        let _: Value = self
            .client
            .post(route, Some(&repository_body(repository)))
            .await
            .map_err(|e| failure(&e))?;
        Ok(())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<(), ApiFailure> {
        self.client
            .repos(owner, name)
            .get()
            .await
            .map(|_| ())
            .map_err(|e| failure(&e))
    }

    async fn edit_repository(&self, repository: &DestinationRepository) -> Result<(), ApiFailure> {
        let mut body = repository_body(repository);
        body["default_branch"] = json!(repository.default_branch);

        let _: Value = self
            .client
            .patch(
                format!("/repos/{}/{}", repository.owner.login(), repository.name),
                Some(&body),
            )
            .await
            .map_err(|e| failure(&e))?;
        Ok(())
    }

    async fn replace_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &[String],
    ) -> Result<(), ApiFailure> {
        let _: Value = self
            .client
            .put(
                format!("/repos/{owner}/{name}/topics"),
                Some(&json!({ "names": topics })),
            )
            .await
            .map_err(|e| failure(&e))?;
        Ok(())
    }

    async fn update_custom_properties(
        &self,
        organization: &str,
        name: &str,
        properties: &[CustomProperty],
    ) -> Result<(), ApiFailure> {
        let properties: Vec<Value> = properties
            .iter()
            .map(|p| json!({ "property_name": p.name, "value": p.value }))
            .collect();

        // 204 No Content on success, so the body is never deserialized.
        let response = self
            .client
            ._patch(
                format!("/repos/{organization}/{name}/properties/values"),
                Some(&json!({ "properties": properties })),
            )
            .await
            .map_err(|e| failure(&e))?;
        octocrab::map_github_error(response)
            .await
            .map(|_| ())
            .map_err(|e| failure(&e))
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pull_request: &NewPullRequest,
    ) -> Result<u64, ApiFailure> {
        self.client
            .pulls(owner, name)
            .create(
                pull_request.title.as_str(),
                pull_request.head.as_str(),
                pull_request.base.as_str(),
            )
            .body(pull_request.body.as_str())
            .draft(Some(pull_request.draft))
            .send()
            .await
            .map(|pr| pr.number)
            .map_err(|e| failure(&e))
    }

    async fn create_issue(
        &self,
        owner: &str,
        name: &str,
        issue: &NewIssue,
    ) -> Result<u64, ApiFailure> {
        self.client
            .issues(owner, name)
            .create(issue.title.as_str())
            .body(issue.body.as_str())
            .labels(issue.labels.clone())
            .send()
            .await
            .map(|created| created.number)
            .map_err(|e| failure(&e))
    }

    async fn close_issue(&self, owner: &str, name: &str, number: u64) -> Result<(), ApiFailure> {
        self.client
            .issues(owner, name)
            .update(number)
            .state(IssueState::Closed)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| failure(&e))
    }

    async fn create_commit_comment(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
        body: &str,
    ) -> Result<(), ApiFailure> {
        let _: Value = self
            .client
            .post(
                format!("/repos/{owner}/{name}/commits/{sha}/comments"),
                Some(&json!({ "body": body })),
            )
            .await
            .map_err(|e| failure(&e))?;
        Ok(())
    }
}
