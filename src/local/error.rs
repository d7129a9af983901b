//! Error types for local working-copy operations.

use thiserror::Error;

/// Errors raised while inspecting or changing the local working copy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocalGitError {
    /// No Git repository contains the path.
    #[error("not inside a Git repository: {path}")]
    NotARepository {
        /// Path that was searched from.
        path: String,
    },

    /// The repository has no working directory.
    #[error("repository at {path} is bare")]
    BareRepository {
        /// Path of the bare repository.
        path: String,
    },

    /// The commit message is blank.
    #[error("commit message must not be blank")]
    EmptyCommitMessage,

    /// The index matches `HEAD`.
    #[error("nothing to commit: the index matches HEAD")]
    NothingToCommit,

    /// A file of the working copy could not be read.
    #[error("could not read {path}: {message}")]
    Io {
        /// Path relative to the working directory.
        path: String,
        /// Underlying error detail.
        message: String,
    },

    /// Git operation failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for LocalGitError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
