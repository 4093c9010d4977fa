//! Shared fixtures and in-memory fakes for unit tests.

use crate::bitbucket::{
    GroupPermission, Permission, SourceApi, SourceError, SourceRepository, UserPermission,
};
use crate::config::{
    BitbucketSettings, CloneProtocol, GitHubSettings, MigrationConfig, Owner, StageToggles,
    DEFAULT_BITBUCKET_API_URL, DEFAULT_PRIVATE_VISIBILITY,
};
use crate::github::{ApiFailure, DestinationApi, NewIssue, NewPullRequest};
use crate::pacing::{Pacer, PacingTimings, Sleeper};
use crate::records::{decode_pull_requests, PullRequestRecord};
use crate::repository::{CustomProperty, DestinationRepository};
use crate::transfer::{ContentTransport, MirrorCheckout, TransferError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn sample_config() -> MigrationConfig {
    MigrationConfig {
        bitbucket: BitbucketSettings {
            workspace: "acme-bb".to_string(),
            username: "migrator".to_string(),
            password: "app-password".to_string(),
            api_url: DEFAULT_BITBUCKET_API_URL.to_string(),
        },
        github: GitHubSettings {
            token: "ghp_test".to_string(),
            owner: Owner::Organization("acme".to_string()),
            api_url: None,
        },
        dry_run: false,
        overwrite: false,
        private_visibility: DEFAULT_PRIVATE_VISIBILITY.to_string(),
        clone_protocol: CloneProtocol::Https,
        post_clone_program: None,
        stages: StageToggles {
            contents: true,
            settings: true,
            open_prs: true,
            closed_prs: true,
            revoke_permissions: true,
        },
    }
}

pub(crate) fn sample_source() -> SourceRepository {
    SourceRepository {
        slug: "widgets".to_string(),
        is_private: true,
        description: "Widget factory".to_string(),
        main_branch: "main".to_string(),
        language: "rust".to_string(),
        project_name: "Core Platform".to_string(),
    }
}

pub(crate) fn open_entry(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Change {id}"),
        "state": "OPEN",
        "author": { "display_name": "Ada Lovelace", "nickname": "ada" },
        "source": { "branch": { "name": format!("feature/{id}") }, "commit": { "hash": "f00" } },
        "destination": { "branch": { "name": "main" } },
        "created_on": "2023-05-04T12:34:56.000000+00:00",
        "updated_on": "2023-05-05T08:00:00.000000+00:00",
        "summary": { "raw": format!("Summary of {id}"), "markup": "markdown" },
        "draft": false
    })
}

pub(crate) fn merged_entry(id: u64) -> Value {
    let mut entry = open_entry(id);
    entry["state"] = json!("MERGED");
    entry["updated_on"] = json!("2023-05-06T09:00:00.000000+00:00");
    entry["closed_by"] = json!({ "display_name": "Grace Hopper" });
    entry["merge_commit"] = json!({ "hash": format!("abc{id}") });
    entry
}

fn decode_one(entry: Value) -> PullRequestRecord {
    decode_pull_requests(&json!({ "values": [entry] }))
        .unwrap()
        .remove(0)
}

pub(crate) fn open_record(id: u64) -> PullRequestRecord {
    decode_one(open_entry(id))
}

pub(crate) fn merged_record(id: u64) -> PullRequestRecord {
    decode_one(merged_entry(id))
}

pub(crate) fn not_found() -> ApiFailure {
    ApiFailure::new(Some(404), "Not Found")
}

pub(crate) fn exists_failure() -> ApiFailure {
    ApiFailure::new(Some(422), "Repository creation failed.")
        .with_detail("{resource:Repository field:name code:custom message:name already exists on this account}")
}

pub(crate) fn pr_exists_failure() -> ApiFailure {
    ApiFailure::new(Some(422), "Validation Failed").with_detail(
        "{resource:PullRequest code:custom message:A pull request already exists for acme:feature/1.}",
    )
}

pub(crate) fn missing_head_failure() -> ApiFailure {
    ApiFailure::new(Some(422), "Validation Failed")
        .with_detail("{resource:PullRequest field:head code:invalid}")
}

/// Records requested sleeps instead of waiting.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    recorded: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn recorded(&self) -> Vec<Duration> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.recorded.lock().unwrap().push(duration);
    }
}

pub(crate) fn recording_pacer() -> (Pacer, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    (
        Pacer::new(sleeper.clone(), PacingTimings::default()),
        sleeper,
    )
}

fn push(journal: &Journal, entry: String) {
    journal.lock().unwrap().push(entry);
}

/// In-memory [`DestinationApi`].
///
/// Every call is journaled as `"<operation> <owner>/<name> ..."`. Failures
/// queued with [`fail_next`](Self::fail_next) are returned by the next calls
/// of that operation, in order.
pub(crate) struct FakeDestination {
    journal: Journal,
    failures: Mutex<Vec<(String, ApiFailure)>>,
    pull_requests: Mutex<Vec<NewPullRequest>>,
    issues: Mutex<Vec<NewIssue>>,
    comments: Mutex<Vec<String>>,
    next_pr: Mutex<u64>,
    next_issue: Mutex<u64>,
}

impl Default for FakeDestination {
    fn default() -> Self {
        Self {
            journal: Journal::default(),
            failures: Mutex::default(),
            pull_requests: Mutex::default(),
            issues: Mutex::default(),
            comments: Mutex::default(),
            next_pr: Mutex::new(1),
            next_issue: Mutex::new(100),
        }
    }
}

impl FakeDestination {
    pub(crate) fn journal(&self) -> Journal {
        self.journal.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub(crate) fn fail_next(&self, operation: &str, failure: ApiFailure) {
        self.failures
            .lock()
            .unwrap()
            .push((operation.to_string(), failure));
    }

    pub(crate) fn fail_probes_with(&self, failures: Vec<ApiFailure>) {
        for failure in failures {
            self.fail_next("get_repository", failure);
        }
    }

    pub(crate) fn pull_requests(&self) -> Vec<NewPullRequest> {
        self.pull_requests.lock().unwrap().clone()
    }

    pub(crate) fn issues(&self) -> Vec<NewIssue> {
        self.issues.lock().unwrap().clone()
    }

    pub(crate) fn comments(&self) -> Vec<String> {
        self.comments.lock().unwrap().clone()
    }

    fn call(&self, operation: &str, entry: String) -> Result<(), ApiFailure> {
        push(&self.journal, entry);
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(op, _)| op == operation) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn next(counter: &Mutex<u64>) -> u64 {
        let mut counter = counter.lock().unwrap();
        let number = *counter;
        *counter += 1;
        number
    }
}

#[async_trait]
impl DestinationApi for FakeDestination {
    async fn create_repository(
        &self,
        repository: &DestinationRepository,
    ) -> Result<(), ApiFailure> {
        self.call(
            "create_repository",
            format!("create_repository {}", repository.full_name()),
        )
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<(), ApiFailure> {
        self.call("get_repository", format!("get_repository {owner}/{name}"))
    }

    async fn edit_repository(&self, repository: &DestinationRepository) -> Result<(), ApiFailure> {
        self.call(
            "edit_repository",
            format!("edit_repository {}", repository.full_name()),
        )
    }

    async fn replace_topics(
        &self,
        owner: &str,
        name: &str,
        _topics: &[String],
    ) -> Result<(), ApiFailure> {
        self.call("replace_topics", format!("replace_topics {owner}/{name}"))
    }

    async fn update_custom_properties(
        &self,
        organization: &str,
        name: &str,
        _properties: &[CustomProperty],
    ) -> Result<(), ApiFailure> {
        self.call(
            "update_custom_properties",
            format!("update_custom_properties {organization}/{name}"),
        )
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pull_request: &NewPullRequest,
    ) -> Result<u64, ApiFailure> {
        self.call(
            "create_pull_request",
            format!("create_pull_request {owner}/{name} {}", pull_request.head),
        )?;
        self.pull_requests.lock().unwrap().push(pull_request.clone());
        Ok(Self::next(&self.next_pr))
    }

    async fn create_issue(
        &self,
        owner: &str,
        name: &str,
        issue: &NewIssue,
    ) -> Result<u64, ApiFailure> {
        self.call("create_issue", format!("create_issue {owner}/{name}"))?;
        self.issues.lock().unwrap().push(issue.clone());
        Ok(Self::next(&self.next_issue))
    }

    async fn close_issue(&self, owner: &str, name: &str, number: u64) -> Result<(), ApiFailure> {
        self.call("close_issue", format!("close_issue {owner}/{name} #{number}"))
    }

    async fn create_commit_comment(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
        body: &str,
    ) -> Result<(), ApiFailure> {
        self.call(
            "create_commit_comment",
            format!("create_commit_comment {owner}/{name} {sha}"),
        )?;
        self.comments.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

/// In-memory [`SourceApi`] with two users, one group and a two-record listing.
pub(crate) struct FakeSource {
    journal: Journal,
    listing: Mutex<Value>,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self::with_journal(Journal::default())
    }
}

impl FakeSource {
    pub(crate) fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            listing: Mutex::new(json!({ "values": [open_entry(1), merged_entry(2)] })),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub(crate) fn set_listing(&self, listing: Value) {
        *self.listing.lock().unwrap() = listing;
    }
}

#[async_trait]
impl SourceApi for FakeSource {
    async fn repository(&self, slug: &str) -> Result<SourceRepository, SourceError> {
        push(&self.journal, format!("repository {slug}"));
        Ok(SourceRepository {
            slug: slug.to_string(),
            ..sample_source()
        })
    }

    async fn user_permissions(&self, slug: &str) -> Result<Vec<UserPermission>, SourceError> {
        push(&self.journal, format!("user_permissions {slug}"));
        Ok(vec![
            UserPermission {
                account_id: "u-1".to_string(),
                display_name: "Ada Lovelace".to_string(),
                permission: Permission::Admin,
            },
            UserPermission {
                account_id: "u-2".to_string(),
                display_name: "Grace Hopper".to_string(),
                permission: Permission::Write,
            },
        ])
    }

    async fn group_permissions(&self, slug: &str) -> Result<Vec<GroupPermission>, SourceError> {
        push(&self.journal, format!("group_permissions {slug}"));
        Ok(vec![GroupPermission {
            group_slug: "developers".to_string(),
            permission: Permission::Write,
        }])
    }

    async fn set_user_permission(
        &self,
        slug: &str,
        account_id: &str,
        permission: Permission,
    ) -> Result<(), SourceError> {
        push(
            &self.journal,
            format!("set_user_permission {slug} {account_id} {permission:?}"),
        );
        Ok(())
    }

    async fn set_group_permission(
        &self,
        slug: &str,
        group_slug: &str,
        permission: Permission,
    ) -> Result<(), SourceError> {
        push(
            &self.journal,
            format!("set_group_permission {slug} {group_slug} {permission:?}"),
        );
        Ok(())
    }

    async fn pull_requests(
        &self,
        slug: &str,
        destination_branch: &str,
    ) -> Result<Value, SourceError> {
        push(
            &self.journal,
            format!("pull_requests {slug} {destination_branch}"),
        );
        Ok(self.listing.lock().unwrap().clone())
    }
}

/// [`ContentTransport`] that only journals.
#[derive(Default)]
pub(crate) struct FakeTransport {
    journal: Journal,
}

impl FakeTransport {
    pub(crate) fn with_journal(journal: Journal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl ContentTransport for FakeTransport {
    async fn clone_mirror(&self, slug: &str) -> Result<MirrorCheckout, TransferError> {
        push(&self.journal, format!("clone_mirror {slug}"));
        Ok(MirrorCheckout::at(std::env::temp_dir()))
    }

    async fn prepare_push(
        &self,
        _checkout: &MirrorCheckout,
        destination: &DestinationRepository,
    ) -> Result<(), TransferError> {
        push(
            &self.journal,
            format!("prepare_push {}", destination.full_name()),
        );
        Ok(())
    }

    async fn push_mirror(&self, _checkout: &MirrorCheckout) -> Result<(), TransferError> {
        push(&self.journal, "push_mirror".to_string());
        Ok(())
    }
}
