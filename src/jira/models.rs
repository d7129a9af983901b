//! Jira data returned to callers.
//!
//! Types prefixed with `Api` mirror the REST v2 payloads and convert into the
//! public types, filling the placeholders Jira leaves out.

use serde::{Deserialize, Serialize};

const NO_PRIORITY: &str = "No Priority";
const UNASSIGNED: &str = "Unassigned";
const UNKNOWN: &str = "Unknown";

/// The account behind the credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JiraUser {
    /// Display name.
    pub display_name: String,
    /// E-mail address, when visible.
    pub email: Option<String>,
    /// Cloud account identifier, when reported.
    pub account_id: Option<String>,
    /// Whether the account is active.
    pub active: bool,
    /// Time zone, when reported.
    pub time_zone: Option<String>,
}

/// An issue as listed by searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Issue key, e.g. `QA-12`.
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Description, empty when unset.
    pub description: String,
    /// Workflow status name.
    pub status: String,
    /// Priority name, or `No Priority`.
    pub priority: String,
    /// Issue type name.
    pub issue_type: String,
    /// Key of the owning project.
    pub project_key: String,
    /// Name of the owning project.
    pub project_name: String,
    /// Assignee display name, or `Unassigned`.
    pub assignee: String,
    /// Reporter display name, or `Unknown`.
    pub reporter: String,
    /// Creation date (`YYYY-MM-DD`).
    pub created: Option<String>,
    /// Last update date (`YYYY-MM-DD`).
    pub updated: Option<String>,
    /// Browser URL, `{server}/browse/{key}`.
    pub url: String,
}

/// A project visible to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Project key.
    pub key: String,
    /// Project name.
    pub name: String,
    /// Description, empty when unset.
    pub description: String,
    /// Lead display name, or `Unknown`.
    pub lead: String,
    /// Project type key, or `Unknown`.
    pub project_type: String,
    /// Browser URL, `{server}/browse/{key}`.
    pub url: String,
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Transition identifier passed back when applying it.
    pub id: String,
    /// Transition name, e.g. `Ready for QA`.
    pub name: String,
    /// Status the issue moves to.
    pub to_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiMyself {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    email_address: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    time_zone: Option<String>,
}

impl From<ApiMyself> for JiraUser {
    fn from(api: ApiMyself) -> Self {
        Self {
            display_name: api.display_name,
            email: api.email_address,
            account_id: api.account_id,
            active: api.active,
            time_zone: api.time_zone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSearchResults {
    #[serde(default)]
    pub(crate) issues: Vec<ApiIssue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIssue {
    key: String,
    fields: ApiIssueFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiIssueFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<ApiNamed>,
    #[serde(default)]
    priority: Option<ApiNamed>,
    #[serde(default, rename = "issuetype")]
    issue_type: Option<ApiNamed>,
    #[serde(default)]
    project: Option<ApiProjectRef>,
    #[serde(default)]
    assignee: Option<ApiPerson>,
    #[serde(default)]
    reporter: Option<ApiPerson>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiNamed {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiProjectRef {
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPerson {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiProject {
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lead: Option<ApiPerson>,
    #[serde(default)]
    project_type_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTransitions {
    #[serde(default)]
    pub(crate) transitions: Vec<ApiTransition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTransition {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    to: Option<ApiNamed>,
}

fn person_or(person: Option<ApiPerson>, fallback: &str) -> String {
    person
        .and_then(|found| found.display_name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

fn date_part(timestamp: Option<String>) -> Option<String> {
    timestamp.map(|value| value.chars().take(10).collect())
}

/// Browser URL of `key` on `server`.
pub(crate) fn browse_url(server: &str, key: &str) -> String {
    format!("{server}/browse/{key}")
}

impl ApiIssue {
    pub(crate) fn into_issue(self, server: &str) -> Issue {
        let fields = self.fields;
        let (project_key, project_name) = fields
            .project
            .map_or_else(Default::default, |project| (project.key, project.name));
        Issue {
            url: browse_url(server, &self.key),
            key: self.key,
            summary: fields.summary,
            description: fields.description.unwrap_or_default(),
            status: fields.status.map(|status| status.name).unwrap_or_default(),
            priority: fields
                .priority
                .map(|priority| priority.name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| NO_PRIORITY.to_owned()),
            issue_type: fields.issue_type.map(|kind| kind.name).unwrap_or_default(),
            project_key,
            project_name,
            assignee: person_or(fields.assignee, UNASSIGNED),
            reporter: person_or(fields.reporter, UNKNOWN),
            created: date_part(fields.created),
            updated: date_part(fields.updated),
        }
    }
}

impl ApiProject {
    pub(crate) fn into_project(self, server: &str) -> Project {
        Project {
            url: browse_url(server, &self.key),
            key: self.key,
            name: self.name,
            description: self.description.unwrap_or_default(),
            lead: person_or(self.lead, UNKNOWN),
            project_type: self
                .project_type_key
                .unwrap_or_else(|| UNKNOWN.to_owned()),
        }
    }
}

impl From<ApiTransition> for Transition {
    fn from(api: ApiTransition) -> Self {
        Self {
            id: api.id,
            name: api.name,
            to_status: api.to.map(|status| status.name),
        }
    }
}
