//! Jira issue lookup and workflow transitions.
//!
//! [`IssueTracker`] is the capability the CLI talks to; [`JiraClient`]
//! implements it over the Jira REST v2 API with basic authentication
//! (username plus API token).

pub mod error;
pub mod models;
mod rest;

pub use error::JiraError;
pub use models::{Issue, JiraUser, Project, Transition};
pub use rest::{JiraClient, JiraConfig};

use async_trait::async_trait;

/// Default result limit for [`IssueTracker::assigned_issues`].
pub const DEFAULT_ASSIGNED_LIMIT: u32 = 50;
/// Default result limit for [`IssueTracker::project_issues`].
pub const DEFAULT_PROJECT_LIMIT: u32 = 30;
/// Default result limit for [`IssueTracker::search_issues`].
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// JQL selecting the caller's open issues, most recently updated first.
pub const ASSIGNED_ISSUES_JQL: &str =
    "assignee = currentUser() AND resolution = Unresolved ORDER BY updated DESC";

/// JQL selecting every issue of `project_key`, most recently updated first.
#[must_use]
pub fn project_issues_jql(project_key: &str) -> String {
    let quoted = project_key.replace('\\', "\\\\").replace('"', "\\\"");
    format!("project = \"{quoted}\" ORDER BY updated DESC")
}

/// Issue-tracker operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Verify the credentials and return the account they belong to.
    async fn connect(&self) -> Result<JiraUser, JiraError>;

    /// Unresolved issues assigned to the caller.
    async fn assigned_issues(&self, max_results: u32) -> Result<Vec<Issue>, JiraError>;

    /// Issues of one project.
    async fn project_issues(
        &self,
        project_key: &str,
        max_results: u32,
    ) -> Result<Vec<Issue>, JiraError>;

    /// Issues matching a JQL query.
    async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>, JiraError>;

    /// Projects visible to the caller.
    async fn projects(&self) -> Result<Vec<Project>, JiraError>;

    /// Transitions currently available on an issue.
    async fn transitions(&self, issue_key: &str) -> Result<Vec<Transition>, JiraError>;

    /// Apply a transition, optionally adding a comment in the same request.
    async fn apply_transition<'a>(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&'a str>,
    ) -> Result<(), JiraError>;
}
