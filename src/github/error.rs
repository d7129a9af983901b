//! Error types exposed by the GitHub layer.

use thiserror::Error;

use crate::report::ValidationError;

/// Errors surfaced while parsing input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The repository reference could not be parsed.
    #[error("invalid repository: {message}")]
    InvalidRepository {
        /// Why the reference was rejected.
        message: String,
    },

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The API returned 403/429 with a rate limit message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// A branch name broke one of the git reference naming rules.
    #[error("invalid branch name: {reason}")]
    InvalidBranchName {
        /// Which rule was broken.
        reason: String,
    },

    /// The branch to create already exists.
    #[error("branch `{name}` already exists")]
    BranchExists {
        /// Branch name.
        name: String,
    },

    /// The branch does not exist.
    #[error("branch `{name}` does not exist")]
    BranchNotFound {
        /// Branch name.
        name: String,
    },

    /// Deleting the repository's default branch was refused.
    #[error("branch `{name}` is the default branch and cannot be deleted")]
    ProtectedDefaultBranch {
        /// Branch name.
        name: String,
    },
}

impl From<ValidationError> for GitHubError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::InvalidBranchName { reason } => Self::InvalidBranchName { reason },
            other => Self::InvalidBranchName {
                reason: other.to_string(),
            },
        }
    }
}
