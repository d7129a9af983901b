//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`migrations`]: Database schema migrations
//! - [`reports`]: Rendering and sending reports, plain messages, history
//! - [`slack`]: Slack listings, the cached user directory, connection check
//! - [`branches`]: GitHub repositories, issues and branches
//! - [`jira`]: Jira queries and transitions
//! - [`git`]: The local working copy
//!
//! Output formatting utilities are in [`output`].

pub mod branches;
pub mod error;
pub mod git;
pub mod input;
pub mod jira;
pub mod migrations;
pub mod output;
pub mod reports;
pub mod slack;

use qa_generator::persistence::{LocalStore, migrate_database};
use qa_generator::telemetry::NoopTelemetrySink;
use qa_generator::{OperationMode, QaGeneratorConfig, Settings};

use error::CliError;
use output::{to_stdout, write_usage};

/// The migrated local store and the settings loaded from it.
pub struct Session {
    /// Store holding settings, history and the Slack user cache.
    pub store: LocalStore,
    /// Saved settings, including any persisted on this run.
    pub settings: Settings,
}

impl Session {
    /// Migrates the configured database, loads the saved settings and,
    /// when `save_settings` is set, stores this run's credentials first.
    pub fn open(config: &QaGeneratorConfig) -> Result<Self, CliError> {
        let database_url = config.require_database_url()?;
        migrate_database(database_url, &NoopTelemetrySink)?;
        let store = LocalStore::new(database_url)?;
        let saved = Settings::load(&store)?;

        let settings = if config.save_settings {
            let updated = config.settings_to_save(&saved);
            updated.save(&store)?;
            updated
        } else {
            saved
        };

        Ok(Self { store, settings })
    }
}

/// Returns `value` or a configuration error naming `flag`.
pub fn require<'a>(value: Option<&'a str>, flag: &str) -> Result<&'a str, CliError> {
    value
        .map(str::trim)
        .filter(|present| !present.is_empty())
        .ok_or_else(|| CliError::Configuration {
            message: format!("{flag} is required"),
        })
}

/// Runs the operation selected by `config`.
pub async fn run(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let mode = config.operation_mode();
    tracing::debug!(?mode, "running operation");

    match mode {
        OperationMode::MigrateDatabase => return migrations::run(config),
        OperationMode::Render => return reports::render(config),
        OperationMode::Usage => return to_stdout(|out| write_usage(out)),
        OperationMode::GitStatus => return git::status(config).await,
        OperationMode::GitDiff => return git::diff(config).await,
        OperationMode::GitCommit => return git::commit(config).await,
        OperationMode::GitStage => return git::stage(config).await,
        OperationMode::GitUnstage => return git::unstage(config).await,
        OperationMode::GitBranch => return git::branch(config).await,
        _ => {}
    }

    let session = Session::open(config)?;
    match mode {
        OperationMode::History => reports::history(&session),
        OperationMode::SaveSettings => reports::save_settings(&session),
        OperationMode::SendReport => reports::send_report(config, &session).await,
        OperationMode::SendMessage => reports::send_message(config, &session).await,
        OperationMode::ListChannels => slack::list_channels(config, &session).await,
        OperationMode::ListUsers => slack::list_users(config, &session).await,
        OperationMode::CachedUsers => slack::cached_users(&session),
        OperationMode::TestSlack => slack::test_connection(config, &session).await,
        OperationMode::ListRepositories => branches::list_repositories(config, &session).await,
        OperationMode::ListBranches => branches::list_branches(config, &session).await,
        OperationMode::CreateBranch => branches::create_branch(config, &session).await,
        OperationMode::DeleteBranch => branches::delete_branch(config, &session).await,
        OperationMode::SuggestBranch => branches::suggest_branch(config, &session).await,
        OperationMode::RepositoryDetails => branches::repository_details(config, &session).await,
        OperationMode::RepositoryIssues => branches::repository_issues(config, &session).await,
        OperationMode::JiraAssigned => jira::assigned(config, &session).await,
        OperationMode::JiraSearch => jira::search(config, &session).await,
        OperationMode::JiraProjects => jira::projects(config, &session).await,
        OperationMode::JiraProjectIssues => jira::project_issues(config, &session).await,
        OperationMode::JiraTransitions => jira::transitions(config, &session).await,
        OperationMode::JiraApplyTransition => jira::apply_transition(config, &session).await,
        OperationMode::MigrateDatabase
        | OperationMode::Render
        | OperationMode::Usage
        | OperationMode::GitStatus
        | OperationMode::GitDiff
        | OperationMode::GitCommit
        | OperationMode::GitStage
        | OperationMode::GitUnstage
        | OperationMode::GitBranch => Ok(()),
    }
}
