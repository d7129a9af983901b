//! Jira REST v2 implementation of [`IssueTracker`].

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::models::{ApiMyself, ApiProject, ApiSearchResults, ApiTransitions};
use super::{ASSIGNED_ISSUES_JQL, Issue, IssueTracker, JiraError, JiraUser, Project, Transition};
use crate::http_body::truncate_for_message;
use crate::url_path::encode_segments;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_CHARS: usize = 160;

/// Connection settings for [`JiraClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraConfig {
    /// Server base URL without a trailing `/`.
    pub server: String,
    /// Account e-mail or username.
    pub username: String,
    /// API token.
    pub token: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl JiraConfig {
    /// Builds settings for `server`, dropping a trailing `/`.
    #[must_use]
    pub fn new(server: &str, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.trim().trim_end_matches('/').to_owned(),
            username: username.into(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Jira REST client.
///
/// Every operation other than [`IssueTracker::connect`] fails with
/// [`JiraError::NotConnected`] until a connection has been verified.
#[derive(Debug)]
pub struct JiraClient {
    config: JiraConfig,
    http: Client,
    user: OnceLock<JiraUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
}

impl JiraClient {
    /// Builds a client from `config` without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Configuration`] when a setting is blank or the
    /// HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> Result<Self, JiraError> {
        let missing = [
            ("server URL", config.server.as_str()),
            ("username", config.username.as_str()),
            ("API token", config.token.as_str()),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = missing {
            return Err(JiraError::Configuration {
                message: format!("Jira {field} is required"),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| JiraError::Configuration {
                message: format!("failed to configure Jira HTTP client: {error}"),
            })?;

        Ok(Self {
            config,
            http,
            user: OnceLock::new(),
        })
    }

    /// The verified account, once [`IssueTracker::connect`] has succeeded.
    #[must_use]
    pub fn connected_user(&self) -> Option<&JiraUser> {
        self.user.get()
    }

    fn endpoint<'a, I>(&self, segments: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        format!(
            "{}/rest/api/2/{}",
            self.config.server,
            encode_segments(segments)
        )
    }

    fn ensure_connected(&self) -> Result<(), JiraError> {
        if self.user.get().is_some() {
            Ok(())
        } else {
            Err(JiraError::NotConnected)
        }
    }

    async fn execute(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, JiraError> {
        let response = request
            .basic_auth(&self.config.username, Some(&self.config.token))
            .send()
            .await
            .map_err(|error| {
                tracing::warn!(operation, %error, "Jira request failed");
                JiraError::Network {
                    message: format!("{operation} transport failed: {error}"),
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Err(JiraError::Authentication { message })
        } else {
            Err(JiraError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch<T>(&self, operation: &str, request: RequestBuilder) -> Result<T, JiraError>
    where
        T: DeserializeOwned,
    {
        self.execute(operation, request)
            .await?
            .json()
            .await
            .map_err(|error| JiraError::Decode {
                message: format!("{operation} response decoding failed: {error}"),
            })
    }

    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>, JiraError> {
        self.ensure_connected()?;
        let request = self.http.get(self.endpoint(["search"])).query(&[
            ("jql", jql.to_owned()),
            ("maxResults", max_results.to_string()),
        ]);
        let results: ApiSearchResults = self.fetch("search", request).await?;
        tracing::debug!(jql, count = results.issues.len(), "Jira search completed");

        Ok(results
            .issues
            .into_iter()
            .map(|issue| issue.into_issue(&self.config.server))
            .collect())
    }
}

fn error_message(body: &str) -> String {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.error_messages.is_empty() {
        if body.trim().is_empty() {
            "(empty response body)".to_owned()
        } else {
            truncate_for_message(body, ERROR_BODY_CHARS)
        }
    } else {
        parsed.error_messages.join("; ")
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn connect(&self) -> Result<JiraUser, JiraError> {
        let request = self.http.get(self.endpoint(["myself"]));
        let user: JiraUser = self.fetch::<ApiMyself>("myself", request).await?.into();
        tracing::info!(server = %self.config.server, user = %user.display_name, "connected to Jira");
        if self.user.set(user.clone()).is_err() {
            tracing::debug!("Jira connection re-verified");
        }
        Ok(user)
    }

    async fn assigned_issues(&self, max_results: u32) -> Result<Vec<Issue>, JiraError> {
        self.search(ASSIGNED_ISSUES_JQL, max_results).await
    }

    async fn project_issues(
        &self,
        project_key: &str,
        max_results: u32,
    ) -> Result<Vec<Issue>, JiraError> {
        self.search(&super::project_issues_jql(project_key), max_results)
            .await
    }

    async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>, JiraError> {
        self.search(jql, max_results).await
    }

    async fn projects(&self) -> Result<Vec<Project>, JiraError> {
        self.ensure_connected()?;
        let request = self.http.get(self.endpoint(["project"]));
        let projects: Vec<ApiProject> = self.fetch("project", request).await?;

        Ok(projects
            .into_iter()
            .map(|project| project.into_project(&self.config.server))
            .collect())
    }

    async fn transitions(&self, issue_key: &str) -> Result<Vec<Transition>, JiraError> {
        self.ensure_connected()?;
        let request = self
            .http
            .get(self.endpoint(["issue", issue_key.trim(), "transitions"]));
        let payload: ApiTransitions = self.fetch("transitions", request).await?;

        Ok(payload.transitions.into_iter().map(Transition::from).collect())
    }

    async fn apply_transition<'a>(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&'a str>,
    ) -> Result<(), JiraError> {
        self.ensure_connected()?;
        let body = comment
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map_or_else(
                || json!({ "transition": { "id": transition_id } }),
                |text| {
                    json!({
                        "transition": { "id": transition_id },
                        "update": { "comment": [{ "add": { "body": text } }] },
                    })
                },
            );

        let request = self
            .http
            .post(self.endpoint(["issue", issue_key.trim(), "transitions"]))
            .json(&body);
        self.execute("transition", request).await?;
        tracing::info!(issue = issue_key, transition = transition_id, "Jira transition applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
