//! Local working-copy operations.
//!
//! git2 calls block, so each operation runs on tokio's blocking pool.

use std::path::PathBuf;

use qa_generator::QaGeneratorConfig;
use qa_generator::local::{Git2WorkingCopy, LocalGitError, WorkingCopy};

use super::error::CliError;
use super::output::{to_stdout, write_changed_files, write_text};
use super::require;

fn working_copy_path(config: &QaGeneratorConfig) -> PathBuf {
    let configured = config
        .git_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty());
    PathBuf::from(configured.unwrap_or("."))
}

/// Opens the working copy containing `git_path` and runs `operation` on it.
async fn with_working_copy<T, F>(config: &QaGeneratorConfig, operation: F) -> Result<T, CliError>
where
    F: FnOnce(&Git2WorkingCopy) -> Result<T, LocalGitError> + Send + 'static,
    T: Send + 'static,
{
    let path = working_copy_path(config);
    let outcome = tokio::task::spawn_blocking(move || {
        let working_copy = Git2WorkingCopy::discover(&path)?;
        operation(&working_copy)
    })
    .await
    .map_err(|error| CliError::Io {
        message: format!("working copy operation did not complete: {error}"),
    })?;
    Ok(outcome?)
}

/// Lists changed files.
pub async fn status(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let files = with_working_copy(config, |working_copy| working_copy.changed_files()).await?;
    to_stdout(|stdout| write_changed_files(stdout, &files))
}

/// Prints the diff of the configured file.
pub async fn diff(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let path = require(config.git_diff.as_deref(), "--git-diff")?.to_owned();
    let text = with_working_copy(config, move |working_copy| working_copy.file_diff(&path)).await?;
    to_stdout(|stdout| write_text(stdout, text.trim_end_matches('\n')))
}

/// Stages the configured file.
pub async fn stage(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let path = require(config.git_stage.as_deref(), "--git-stage")?.to_owned();
    let message = format!("Staged {path}");
    with_working_copy(config, move |working_copy| working_copy.stage(&path)).await?;
    to_stdout(|stdout| write_text(stdout, &message))
}

/// Unstages the configured file.
pub async fn unstage(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let path = require(config.git_unstage.as_deref(), "--git-unstage")?.to_owned();
    let message = format!("Unstaged {path}");
    with_working_copy(config, move |working_copy| working_copy.unstage(&path)).await?;
    to_stdout(|stdout| write_text(stdout, &message))
}

/// Commits the index, staging `--git-stage` first when given.
pub async fn commit(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let message = require(config.git_commit.as_deref(), "--git-commit")?.to_owned();
    let staged: Vec<String> = config
        .git_stage
        .iter()
        .map(|path| path.trim().to_owned())
        .filter(|path| !path.is_empty())
        .collect();
    let outcome = with_working_copy(config, move |working_copy| {
        let paths: Vec<&str> = staged.iter().map(String::as_str).collect();
        working_copy.commit(&message, &paths)
    })
    .await?;
    to_stdout(|stdout| {
        write_text(
            stdout,
            &format!(
                "Committed {} on {}: {}",
                outcome.short_sha, outcome.branch, outcome.summary
            ),
        )
    })
}

/// Prints the current branch.
pub async fn branch(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let name = with_working_copy(config, |working_copy| working_copy.current_branch()).await?;
    to_stdout(|stdout| write_text(stdout, &name))
}
