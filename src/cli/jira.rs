//! Jira queries and transitions.

use qa_generator::QaGeneratorConfig;
use qa_generator::jira::{
    DEFAULT_ASSIGNED_LIMIT, DEFAULT_PROJECT_LIMIT, DEFAULT_SEARCH_LIMIT, IssueTracker, JiraClient,
};

use super::error::CliError;
use super::output::{
    to_stdout, write_assigned_issues, write_issues, write_projects, write_text, write_transitions,
};
use super::{Session, require};

async fn connect(config: &QaGeneratorConfig, session: &Session) -> Result<JiraClient, CliError> {
    let client = JiraClient::new(config.resolve_jira(&session.settings)?)?;
    client.connect().await?;
    Ok(client)
}

/// Lists unresolved issues assigned to the user.
pub async fn assigned(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let client = connect(config, session).await?;
    let limit = config.max_results.unwrap_or(DEFAULT_ASSIGNED_LIMIT);
    let issues = client.assigned_issues(limit).await?;
    let owner = client.connected_user();
    to_stdout(|stdout| write_assigned_issues(stdout, owner, &issues))
}

/// Runs the configured JQL query.
pub async fn search(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let jql = require(config.jql.as_deref(), "--jql")?;
    let client = connect(config, session).await?;
    let limit = config.max_results.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let issues = client.search_issues(jql, limit).await?;
    to_stdout(|stdout| write_issues(stdout, &issues))
}

/// Lists visible projects.
pub async fn projects(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let client = connect(config, session).await?;
    let projects = client.projects().await?;
    to_stdout(|stdout| write_projects(stdout, &projects))
}

/// Lists issues of the configured project and remembers it as the last
/// project browsed.
pub async fn project_issues(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let project = require(config.jira_project.as_deref(), "--jira-project")?;
    let client = connect(config, session).await?;
    let limit = config.max_results.unwrap_or(DEFAULT_PROJECT_LIMIT);
    let issues = client.project_issues(project, limit).await?;
    session
        .store
        .set_config(qa_generator::settings::keys::LAST_PROJECT, project)?;
    to_stdout(|stdout| write_issues(stdout, &issues))
}

/// Lists transitions available on the configured issue.
pub async fn transitions(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let issue = require(config.jira_issue.as_deref(), "--jira-issue")?;
    let client = connect(config, session).await?;
    let transitions = client.transitions(issue).await?;
    to_stdout(|stdout| write_transitions(stdout, &transitions))
}

/// Applies the configured transition.
pub async fn apply_transition(
    config: &QaGeneratorConfig,
    session: &Session,
) -> Result<(), CliError> {
    let issue = require(config.jira_issue.as_deref(), "--jira-issue")?;
    let transition = require(config.transition.as_deref(), "--transition")?;
    let client = connect(config, session).await?;
    client
        .apply_transition(issue, transition, config.transition_comment.as_deref())
        .await?;
    to_stdout(|stdout| write_text(stdout, &format!("Applied transition {transition} to {issue}")))
}
