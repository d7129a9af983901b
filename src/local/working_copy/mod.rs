//! Working-copy operations behind a trait, with a git2 implementation.

mod git2_impl;

use std::fmt::Debug;

use super::error::LocalGitError;
use super::status::ChangedFile;

pub use git2_impl::Git2WorkingCopy;

/// Text returned by [`WorkingCopy::file_diff`] when a file has no changes.
pub const NO_CHANGES: &str = "No changes to show";

/// Name reported by [`WorkingCopy::current_branch`] when `HEAD` is
/// detached.
pub const DETACHED_HEAD: &str = "detached HEAD";

/// A commit created by [`WorkingCopy::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Abbreviated SHA of the new commit.
    pub short_sha: String,
    /// First line of the commit message.
    pub summary: String,
    /// Branch the commit was added to.
    pub branch: String,
}

/// Operations on a local Git working copy.
///
/// Paths are relative to the working directory.
pub trait WorkingCopy: Send + Sync + Debug {
    /// Lists files that differ from `HEAD`, untracked files included, in
    /// path order.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read.
    fn changed_files(&self) -> Result<Vec<ChangedFile>, LocalGitError>;

    /// Returns the diff of `path`: the staged changes when there are any,
    /// otherwise the unstaged ones. Untracked files are shown as wholly
    /// added; [`NO_CHANGES`] is returned for unchanged files.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff cannot be computed or an untracked file
    /// cannot be read.
    fn file_diff(&self, path: &str) -> Result<String, LocalGitError>;

    /// Adds the working-tree state of `path` to the index, recording a
    /// deletion when the file is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated.
    fn stage(&self, path: &str) -> Result<(), LocalGitError>;

    /// Resets the index entry of `path` to `HEAD`, keeping the working
    /// tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated.
    fn unstage(&self, path: &str) -> Result<(), LocalGitError>;

    /// Stages `paths`, then commits the index on the current branch.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError::EmptyCommitMessage`] for a blank message,
    /// [`LocalGitError::NothingToCommit`] when the index matches `HEAD`, or
    /// a git error (for example when no committer identity is configured).
    fn commit(&self, message: &str, paths: &[&str]) -> Result<CommitOutcome, LocalGitError>;

    /// Name of the checked-out branch, [`DETACHED_HEAD`] when detached.
    /// A branch without commits is still reported by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `HEAD` cannot be read.
    fn current_branch(&self) -> Result<String, LocalGitError>;
}
