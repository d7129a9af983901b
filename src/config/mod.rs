//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.qa-generator.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `QA_GENERATOR_SLACK_TOKEN`,
//!    `QA_GENERATOR_DATABASE_URL`, …
//! 4. **Command-line arguments** – `--send-to`, `--report-file`, …
//!
//! Credentials that none of the layers provide fall back to the settings
//! saved in the local store (see [`crate::settings::Settings`]).
//!
//! # Configuration File
//!
//! ```toml
//! database_url = "qa-generator.sqlite"
//! slack_workspace = "acme.slack.com"
//! sent_by = "ana"
//! jira_server = "https://acme.atlassian.net"
//! jira_username = "ana@acme.test"
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::{GitHubError, PersonalAccessToken, RepositoryRef};
use crate::jira::{JiraConfig, JiraError};
use crate::notify::{DispatchError, SlackClientConfig, UNKNOWN_SENDER};
use crate::persistence::PersistenceError;
use crate::settings::Settings;

/// Database file used when no `database_url` is configured.
pub const DEFAULT_DATABASE_URL: &str = "qa-generator.sqlite";

/// Operation mode determined by CLI arguments.
///
/// [`QaGeneratorConfig::operation_mode`] picks the first matching variant in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Apply pending migrations and exit.
    MigrateDatabase,
    /// Print the notification history.
    History,
    /// List Slack channels.
    ListChannels,
    /// List Slack users and cache them locally.
    ListUsers,
    /// Print the Slack users cached by the last listing.
    CachedUsers,
    /// Check the Slack credentials with `auth.test`.
    TestSlack,
    /// List the GitHub user's repositories.
    ListRepositories,
    /// List branches of `repo`.
    ListBranches,
    /// Create `create_branch` in `repo`.
    CreateBranch,
    /// Delete `delete_branch` from `repo`.
    DeleteBranch,
    /// Suggest a free branch name derived from `suggest_branch`.
    SuggestBranch,
    /// Show statistics, branches and the latest commit of `repo`.
    RepositoryDetails,
    /// List open issues of `repo`.
    RepositoryIssues,
    /// List Jira issues assigned to the user.
    JiraAssigned,
    /// Run the `jql` query.
    JiraSearch,
    /// List Jira projects.
    JiraProjects,
    /// List issues of `jira_project`.
    JiraProjectIssues,
    /// Apply `transition` to `jira_issue`.
    JiraApplyTransition,
    /// List transitions available on `jira_issue`.
    JiraTransitions,
    /// List changed files of the local working copy.
    GitStatus,
    /// Show the diff of `git_diff`.
    GitDiff,
    /// Commit the index, after staging `git_stage` when given.
    GitCommit,
    /// Stage `git_stage`.
    GitStage,
    /// Unstage `git_unstage`.
    GitUnstage,
    /// Print the working copy's current branch.
    GitBranch,
    /// Send the report in `report_file` to `send_to`.
    SendReport,
    /// Send `message` to `send_to`.
    SendMessage,
    /// Render the report in `report_file` to standard output.
    Render,
    /// Store the credentials given on this run and exit.
    SaveSettings,
    /// Nothing to do; print usage guidance.
    Usage,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// Every field can be set through `QA_GENERATOR_<FIELD>`, for example
/// `QA_GENERATOR_SLACK_TOKEN` or `QA_GENERATOR_JIRA_SERVER`. Boolean switches
/// are only read from the CLI and configuration files.
///
/// # Example
///
/// ```no_run
/// use qa_generator::QaGeneratorConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = QaGeneratorConfig::load().expect("failed to load configuration");
/// let mode = config.operation_mode();
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "QA_GENERATOR",
    discovery(
        dotfile_name = ".qa-generator.toml",
        config_file_name = "qa-generator.toml",
        app_name = "qa-generator"
    )
)]
pub struct QaGeneratorConfig {
    /// JSON report draft to render or send.
    #[ortho_config(cli_short = 'f')]
    pub report_file: Option<String>,

    /// Slack channel or user ID receiving the report or message. `@name`
    /// is looked up among the cached Slack users.
    #[ortho_config(cli_short = 's')]
    pub send_to: Option<String>,

    /// Plain message; sent before the report when both are given.
    #[ortho_config(cli_short = 'm')]
    pub message: Option<String>,

    /// GitHub personal access token. Falls back to the saved
    /// `github_token`, then the `GITHUB_TOKEN` environment variable.
    #[ortho_config(cli_short = 't')]
    pub github_token: Option<String>,

    /// Repository as `owner/name` or a GitHub URL.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Local `SQLite` database path holding settings and history.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `QA_GENERATOR_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config()]
    pub database_url: Option<String>,

    /// Runs database migrations and exits.
    #[ortho_config()]
    pub migrate_db: bool,

    /// Renders the emoji-decorated Slack summary instead of the plain text.
    #[ortho_config()]
    pub slack_summary: bool,

    /// `minijinja` template used instead of the built-in text layout.
    #[ortho_config()]
    pub template_file: Option<String>,

    /// Prints the notification history.
    #[ortho_config()]
    pub history: bool,

    /// Lists Slack channels.
    #[ortho_config()]
    pub list_channels: bool,

    /// Lists Slack users and caches them in the local store.
    #[ortho_config()]
    pub list_users: bool,

    /// Prints the Slack users cached by the last `--list-users`.
    #[ortho_config()]
    pub cached_users: bool,

    /// Checks that Slack accepts the configured token.
    #[ortho_config()]
    pub test_slack: bool,

    /// Slack bot token. Falls back to the saved `slack_token` setting.
    #[ortho_config()]
    pub slack_token: Option<String>,

    /// Slack workspace host. Falls back to the saved `slack_workspace`.
    #[ortho_config()]
    pub slack_workspace: Option<String>,

    /// Sender name recorded in the history. Falls back to the saved
    /// `slack_user`, then `unknown`.
    #[ortho_config()]
    pub sent_by: Option<String>,

    /// Lists the user's repositories.
    #[ortho_config()]
    pub list_repos: bool,

    /// Lists branches of `repo`, newest first.
    #[ortho_config()]
    pub list_branches: bool,

    /// Branch to create in `repo`.
    #[ortho_config()]
    pub create_branch: Option<String>,

    /// Branch to delete from `repo`.
    #[ortho_config()]
    pub delete_branch: Option<String>,

    /// Source branch for `create_branch`; defaults to the repository's
    /// default branch.
    #[ortho_config()]
    pub source_branch: Option<String>,

    /// Free text from which to suggest an unused branch name.
    #[ortho_config()]
    pub suggest_branch: Option<String>,

    /// Shows statistics, branches and the latest commit of `repo`.
    #[ortho_config()]
    pub repo_details: bool,

    /// Lists open issues of `repo`, pull requests excluded.
    #[ortho_config()]
    pub repo_issues: bool,

    /// Jira server URL. Falls back to the saved `jira_server`.
    #[ortho_config()]
    pub jira_server: Option<String>,

    /// Jira account name. Falls back to the saved `jira_username`.
    #[ortho_config()]
    pub jira_username: Option<String>,

    /// Jira API token. Falls back to the saved `jira_token`.
    #[ortho_config()]
    pub jira_token: Option<String>,

    /// Lists unresolved Jira issues assigned to the user.
    #[ortho_config()]
    pub jira_assigned: bool,

    /// JQL query to run.
    #[ortho_config()]
    pub jql: Option<String>,

    /// Lists Jira projects.
    #[ortho_config()]
    pub jira_projects: bool,

    /// Project whose issues to list.
    #[ortho_config(cli_short = '1')]
    pub jira_project: Option<String>,

    /// Issue whose transitions to list or apply.
    #[ortho_config()]
    pub jira_issue: Option<String>,

    /// Transition ID to apply to `jira_issue`.
    #[ortho_config()]
    pub transition: Option<String>,

    /// Comment added while applying `transition`.
    #[ortho_config()]
    pub transition_comment: Option<String>,

    /// Maximum number of Jira results or open GitHub issues; each query has
    /// its own default.
    #[ortho_config()]
    pub max_results: Option<u32>,

    /// Local working copy for the `git_*` operations; defaults to the
    /// repository containing the current directory.
    #[ortho_config()]
    pub git_path: Option<String>,

    /// Lists changed files of the working copy.
    #[ortho_config(cli_short = '2')]
    pub git_status: bool,

    /// File whose staged or unstaged diff to show.
    #[ortho_config()]
    pub git_diff: Option<String>,

    /// File to stage.
    #[ortho_config(cli_short = '3')]
    pub git_stage: Option<String>,

    /// File to unstage.
    #[ortho_config(cli_short = '4')]
    pub git_unstage: Option<String>,

    /// Commit message; commits the index after staging `git_stage`.
    #[ortho_config(cli_short = '5')]
    pub git_commit: Option<String>,

    /// Prints the working copy's current branch.
    #[ortho_config()]
    pub git_branch: bool,

    /// Stores the credentials given on this run as the saved settings.
    #[ortho_config()]
    pub save_settings: bool,
}

impl Default for QaGeneratorConfig {
    fn default() -> Self {
        Self {
            database_url: Some(DEFAULT_DATABASE_URL.to_owned()),
            migrate_db: false,
            report_file: None,
            slack_summary: false,
            template_file: None,
            send_to: None,
            message: None,
            history: false,
            list_channels: false,
            list_users: false,
            cached_users: false,
            test_slack: false,
            slack_token: None,
            slack_workspace: None,
            sent_by: None,
            github_token: None,
            repo: None,
            list_repos: false,
            list_branches: false,
            create_branch: None,
            delete_branch: None,
            source_branch: None,
            suggest_branch: None,
            repo_details: false,
            repo_issues: false,
            jira_server: None,
            jira_username: None,
            jira_token: None,
            jira_assigned: false,
            jql: None,
            jira_projects: false,
            jira_project: None,
            jira_issue: None,
            transition: None,
            transition_comment: None,
            max_results: None,
            git_path: None,
            git_status: false,
            git_diff: None,
            git_stage: None,
            git_unstage: None,
            git_commit: None,
            git_branch: false,
            save_settings: false,
        }
    }
}

/// First non-blank value among `candidates`, trimmed.
fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

impl QaGeneratorConfig {
    /// Determines the operation mode based on provided configuration.
    ///
    /// Listings and branch, Jira or working-copy operations win over
    /// sending, sending
    /// wins over rendering, and `Usage` is returned when nothing is selected.
    #[must_use]
    pub fn operation_mode(&self) -> OperationMode {
        let has_issue = self.jira_issue.is_some();
        let has_destination = self.send_to.is_some();
        let candidates = [
            (self.migrate_db, OperationMode::MigrateDatabase),
            (self.history, OperationMode::History),
            (self.list_channels, OperationMode::ListChannels),
            (self.list_users, OperationMode::ListUsers),
            (self.cached_users, OperationMode::CachedUsers),
            (self.test_slack, OperationMode::TestSlack),
            (self.list_repos, OperationMode::ListRepositories),
            (self.list_branches, OperationMode::ListBranches),
            (self.create_branch.is_some(), OperationMode::CreateBranch),
            (self.delete_branch.is_some(), OperationMode::DeleteBranch),
            (self.suggest_branch.is_some(), OperationMode::SuggestBranch),
            (self.repo_details, OperationMode::RepositoryDetails),
            (self.repo_issues, OperationMode::RepositoryIssues),
            (self.jira_assigned, OperationMode::JiraAssigned),
            (self.jql.is_some(), OperationMode::JiraSearch),
            (self.jira_projects, OperationMode::JiraProjects),
            (self.jira_project.is_some(), OperationMode::JiraProjectIssues),
            (
                has_issue && self.transition.is_some(),
                OperationMode::JiraApplyTransition,
            ),
            (has_issue, OperationMode::JiraTransitions),
            (self.git_status, OperationMode::GitStatus),
            (self.git_diff.is_some(), OperationMode::GitDiff),
            (self.git_commit.is_some(), OperationMode::GitCommit),
            (self.git_stage.is_some(), OperationMode::GitStage),
            (self.git_unstage.is_some(), OperationMode::GitUnstage),
            (self.git_branch, OperationMode::GitBranch),
            (
                has_destination && self.report_file.is_some(),
                OperationMode::SendReport,
            ),
            (
                has_destination && self.message.is_some(),
                OperationMode::SendMessage,
            ),
            (self.report_file.is_some(), OperationMode::Render),
            (self.save_settings, OperationMode::SaveSettings),
        ];

        candidates
            .into_iter()
            .find_map(|(selected, mode)| selected.then_some(mode))
            .unwrap_or(OperationMode::Usage)
    }

    /// Returns the database path or an error if it is missing or blank.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MissingDatabaseUrl`] when unset and
    /// [`PersistenceError::BlankDatabaseUrl`] when blank.
    pub fn require_database_url(&self) -> Result<&str, PersistenceError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(PersistenceError::MissingDatabaseUrl)?;
        if url.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(url)
    }

    /// Returns the report file or an error if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] when no report file is set.
    pub fn require_report_file(&self) -> Result<&str, DispatchError> {
        self.report_file
            .as_deref()
            .ok_or_else(|| DispatchError::Configuration {
                message: "report file is required (use --report-file or -f)".to_owned(),
            })
    }

    /// Builds the Slack client settings from configuration or saved
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] when no token is available.
    pub fn resolve_slack(&self, settings: &Settings) -> Result<SlackClientConfig, DispatchError> {
        let token = first_present([
            self.slack_token.as_deref(),
            settings.slack_token.as_deref(),
        ])
        .ok_or_else(|| DispatchError::Configuration {
            message: concat!(
                "Slack token is required (use --slack-token, ",
                "QA_GENERATOR_SLACK_TOKEN, or the saved settings)"
            )
            .to_owned(),
        })?;
        let workspace = first_present([
            self.slack_workspace.as_deref(),
            settings.slack_workspace.as_deref(),
        ]);
        Ok(SlackClientConfig::new(token, workspace.as_deref()))
    }

    /// Sender name recorded in the history.
    #[must_use]
    pub fn resolve_sent_by(&self, settings: &Settings) -> String {
        first_present([self.sent_by.as_deref(), settings.slack_user.as_deref()])
            .unwrap_or_else(|| UNKNOWN_SENDER.to_owned())
    }

    /// Resolves the GitHub token from configuration, saved settings, or the
    /// `GITHUB_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingToken`] when no source provides a value.
    pub fn resolve_github_token(
        &self,
        settings: &Settings,
    ) -> Result<PersonalAccessToken, GitHubError> {
        let environment = env::var("GITHUB_TOKEN").ok();
        let token = first_present([
            self.github_token.as_deref(),
            settings.github_token.as_deref(),
            environment.as_deref(),
        ])
        .ok_or(GitHubError::MissingToken)?;
        PersonalAccessToken::new(token)
    }

    /// Parses the configured repository.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidRepository`] when `repo` is missing or
    /// cannot be parsed.
    pub fn require_repository(&self) -> Result<RepositoryRef, GitHubError> {
        let repo = self
            .repo
            .as_deref()
            .ok_or_else(|| GitHubError::InvalidRepository {
                message: "repository is required (use --repo or -r)".to_owned(),
            })?;
        RepositoryRef::parse(repo)
    }

    /// Builds the Jira client settings from configuration or saved
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Configuration`] naming the first missing value.
    pub fn resolve_jira(&self, settings: &Settings) -> Result<JiraConfig, JiraError> {
        let require = |value: Option<String>, flag: &str| {
            value.ok_or_else(|| JiraError::Configuration {
                message: format!("{flag} is required (or save it in the settings)"),
            })
        };
        let server = require(
            first_present([
                self.jira_server.as_deref(),
                settings.jira_server.as_deref(),
            ]),
            "--jira-server",
        )?;
        let username = require(
            first_present([
                self.jira_username.as_deref(),
                settings.jira_username.as_deref(),
            ]),
            "--jira-username",
        )?;
        let token = require(
            first_present([self.jira_token.as_deref(), settings.jira_token.as_deref()]),
            "--jira-token",
        )?;
        Ok(JiraConfig::new(&server, username, token))
    }

    /// Settings to persist when `save_settings` is set: the credentials
    /// given on this run layered over `current`.
    #[must_use]
    pub fn settings_to_save(&self, current: &Settings) -> Settings {
        let pick = |configured: Option<&String>, saved: Option<&String>| {
            first_present([configured.map(String::as_str)]).or_else(|| saved.cloned())
        };
        Settings {
            slack_token: pick(self.slack_token.as_ref(), current.slack_token.as_ref()),
            slack_user: pick(self.sent_by.as_ref(), current.slack_user.as_ref()),
            slack_workspace: pick(
                self.slack_workspace.as_ref(),
                current.slack_workspace.as_ref(),
            ),
            github_token: pick(self.github_token.as_ref(), current.github_token.as_ref()),
            jira_server: pick(self.jira_server.as_ref(), current.jira_server.as_ref()),
            jira_username: pick(self.jira_username.as_ref(), current.jira_username.as_ref()),
            jira_token: pick(self.jira_token.as_ref(), current.jira_token.as_ref()),
            last_project: pick(self.jira_project.as_ref(), current.last_project.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests;
