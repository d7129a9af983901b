//! Errors surfaced by the command-line front end.

use qa_generator::github::GitHubError;
use qa_generator::jira::JiraError;
use qa_generator::local::LocalGitError;
use qa_generator::notify::DispatchError;
use qa_generator::persistence::PersistenceError;
use qa_generator::report::{TemplateError, ValidationError};
use thiserror::Error;

/// Every failure an operation mode can report. Displayed as one line on
/// stderr before the process exits with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Report input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A custom template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Slack delivery failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The local store could not be used.
    #[error(transparent)]
    Storage(#[from] PersistenceError),

    /// A GitHub operation failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// A Jira operation failed.
    #[error(transparent)]
    Jira(#[from] JiraError),

    /// A local working-copy operation failed.
    #[error(transparent)]
    LocalGit(#[from] LocalGitError),

    /// Arguments or configuration files could not be used.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong.
        message: String,
    },

    /// Reading input or writing output failed.
    #[error("I/O error: {message}")]
    Io {
        /// Underlying error detail.
        message: String,
    },

    /// The run was interrupted before the operation finished.
    #[error("interrupted")]
    Interrupted,
}

/// Wraps an I/O failure.
pub fn io_error(error: &std::io::Error) -> CliError {
    CliError::Io {
        message: error.to_string(),
    }
}
