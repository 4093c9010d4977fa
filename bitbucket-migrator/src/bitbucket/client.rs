//! reqwest-backed Bitbucket Cloud client.

use super::error::SourceError;
use super::models::{
    ApiGroupPermission, ApiRepository, ApiUserPermission, GroupPermission, Permission,
    SourceRepository, UserPermission,
};
use super::SourceApi;
use crate::config::BitbucketSettings;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Page size requested from paginated endpoints.
const PAGE_LEN: &str = "50";

/// Bitbucket Cloud REST 2.0 client using basic authentication.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
    api_url: String,
    workspace: String,
    username: String,
    password: String,
}

impl BitbucketClient {
    /// Creates a client for the configured workspace.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client can't be built.
    pub fn new(settings: &BitbucketSettings) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(concat!("bitbucket-migrator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            workspace: settings.workspace.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Builds `<api>/repositories/<workspace>/<slug>/<rest...>`.
    fn endpoint(&self, slug: &str, rest: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|()| SourceError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["repositories", self.workspace.as_str(), slug])
            .extend(rest);
        Ok(url)
    }

    async fn get_json(&self, url: Url, context: &str) -> Result<Value, SourceError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        read_json(response, context).await
    }

    /// Collects `values` across every page, following `next` links.
    async fn get_all_values(&self, url: Url, context: &str) -> Result<Vec<Value>, SourceError> {
        let mut values = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            let page = self.get_json(url, context).await?;
            let items = page
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| SourceError::MissingField {
                    context: context.to_string(),
                    field: "values",
                })?;
            values.extend(items.iter().cloned());
            next = page
                .get("next")
                .and_then(Value::as_str)
                .map(Url::parse)
                .transpose()?;
        }

        Ok(values)
    }

    async fn put_permission(&self, url: Url, permission: Permission) -> Result<(), SourceError> {
        debug!(%url, ?permission, "PUT");
        let response = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&json!({ "permission": permission }))
            .send()
            .await?;
        read_json(response, "permission update").await.map(|_| ())
    }
}

async fn read_json(response: Response, context: &str) -> Result<Value, SourceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| SourceError::Decode {
        context: context.to_string(),
        source: e,
    })
}

/// Extracts `error.message` from a Bitbucket error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>, context: &str) -> Result<Vec<T>, SourceError> {
    values
        .into_iter()
        .map(|v| {
            serde_json::from_value(v).map_err(|e| SourceError::Decode {
                context: context.to_string(),
                source: e,
            })
        })
        .collect()
}

#[async_trait]
impl SourceApi for BitbucketClient {
    async fn repository(&self, slug: &str) -> Result<SourceRepository, SourceError> {
        let value = self.get_json(self.endpoint(slug, &[])?, slug).await?;
        let api: ApiRepository =
            serde_json::from_value(value).map_err(|e| SourceError::Decode {
                context: slug.to_string(),
                source: e,
            })?;

        let main_branch = api.mainbranch.ok_or_else(|| SourceError::MissingField {
            context: slug.to_string(),
            field: "mainbranch",
        })?;
        let project = api.project.ok_or_else(|| SourceError::MissingField {
            context: slug.to_string(),
            field: "project",
        })?;

        Ok(SourceRepository {
            slug: api.slug,
            is_private: api.is_private,
            description: api.description,
            main_branch: main_branch.name,
            language: api.language,
            project_name: project.name,
        })
    }

    async fn user_permissions(&self, slug: &str) -> Result<Vec<UserPermission>, SourceError> {
        let url = self.endpoint(slug, &["permissions-config", "users"])?;
        let values = self.get_all_values(url, "user permissions").await?;
        let entries: Vec<ApiUserPermission> = decode_all(values, "user permissions")?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    async fn group_permissions(&self, slug: &str) -> Result<Vec<GroupPermission>, SourceError> {
        let url = self.endpoint(slug, &["permissions-config", "groups"])?;
        let values = self.get_all_values(url, "group permissions").await?;
        let entries: Vec<ApiGroupPermission> = decode_all(values, "group permissions")?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    async fn set_user_permission(
        &self,
        slug: &str,
        account_id: &str,
        permission: Permission,
    ) -> Result<(), SourceError> {
        let url = self.endpoint(slug, &["permissions-config", "users", account_id])?;
        self.put_permission(url, permission).await
    }

    async fn set_group_permission(
        &self,
        slug: &str,
        group_slug: &str,
        permission: Permission,
    ) -> Result<(), SourceError> {
        let url = self.endpoint(slug, &["permissions-config", "groups", group_slug])?;
        self.put_permission(url, permission).await
    }

    async fn pull_requests(
        &self,
        slug: &str,
        destination_branch: &str,
    ) -> Result<Value, SourceError> {
        let mut url = self.endpoint(slug, &["pullrequests"])?;
        url.query_pairs_mut()
            .append_pair("state", "MERGED")
            .append_pair("state", "OPEN")
            .append_pair(
                "q",
                &format!("destination.branch.name = \"{destination_branch}\""),
            )
            .append_pair("pagelen", PAGE_LEN);

        let mut values = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page = self.get_json(url, "pull requests").await?;
            // Error-shaped payloads are handed to the record adapter as-is.
            if page.get("type").and_then(Value::as_str) == Some("error") {
                return Ok(page);
            }
            let items = page
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| SourceError::MissingField {
                    context: format!("pull requests of {slug}"),
                    field: "values",
                })?;
            values.extend(items.iter().cloned());
            next = page
                .get("next")
                .and_then(Value::as_str)
                .map(Url::parse)
                .transpose()?;
        }

        let size = values.len();
        Ok(json!({ "values": values, "size": size }))
    }
}
