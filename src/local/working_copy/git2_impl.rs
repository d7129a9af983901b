//! git2-based implementation of [`WorkingCopy`].

use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use git2::{
    Diff, DiffFormat, DiffOptions, ErrorCode, ObjectType, Repository, Status, StatusEntry,
    StatusOptions, Tree,
};

use super::{CommitOutcome, DETACHED_HEAD, NO_CHANGES, WorkingCopy};
use crate::local::error::LocalGitError;
use crate::local::status::{ChangedFile, porcelain_code};

const SHORT_SHA_CHARS: usize = 7;

/// Working copy backed by `git2`.
///
/// `git2::Repository` is not `Sync`, so it sits behind a `Mutex`; callers
/// on an async runtime should move calls onto a blocking thread.
pub struct Git2WorkingCopy {
    repo: Mutex<Repository>,
}

impl std::fmt::Debug for Git2WorkingCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2WorkingCopy")
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl Git2WorkingCopy {
    fn from_repo_result(
        result: Result<Repository, git2::Error>,
        path: &Path,
    ) -> Result<Self, LocalGitError> {
        let repo = result.map_err(|error| {
            tracing::debug!(path = %path.display(), error = error.message(), "no repository found");
            LocalGitError::NotARepository {
                path: path.display().to_string(),
            }
        })?;
        if repo.is_bare() {
            return Err(LocalGitError::BareRepository {
                path: path.display().to_string(),
            });
        }
        Ok(Self::from_repository(repo))
    }

    /// Opens the repository whose working directory is `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError::NotARepository`] when `path` is not a
    /// repository and [`LocalGitError::BareRepository`] when it has no
    /// working directory.
    pub fn open(path: &Path) -> Result<Self, LocalGitError> {
        Self::from_repo_result(Repository::open(path), path)
    }

    /// Opens the repository containing `start_path`, searching upwards.
    ///
    /// # Errors
    ///
    /// Returns [`LocalGitError::NotARepository`] when no repository is found
    /// and [`LocalGitError::BareRepository`] when it has no working
    /// directory.
    pub fn discover(start_path: &Path) -> Result<Self, LocalGitError> {
        Self::from_repo_result(Repository::discover(start_path), start_path)
    }

    /// Wraps an already opened repository.
    #[must_use]
    pub const fn from_repository(repo: Repository) -> Self {
        Self {
            repo: Mutex::new(repo),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Repository>, LocalGitError> {
        self.repo.lock().map_err(|_| LocalGitError::Git {
            message: "working copy lock poisoned".to_owned(),
        })
    }
}

impl WorkingCopy for Git2WorkingCopy {
    fn changed_files(&self) -> Result<Vec<ChangedFile>, LocalGitError> {
        let repo = self.lock()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);
        let statuses = repo.statuses(Some(&mut options))?;

        let mut files: Vec<ChangedFile> = statuses
            .iter()
            .filter_map(|entry| {
                let code = porcelain_code(entry.status())?;
                let path = entry_path(&entry)?;
                Some(ChangedFile::new(path, code))
            })
            .collect();
        files.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(files)
    }

    fn file_diff(&self, path: &str) -> Result<String, LocalGitError> {
        let repo = self.lock()?;
        let status = match repo.status_file(Path::new(path)) {
            Ok(found) => found,
            Err(error) if error.code() == ErrorCode::NotFound => Status::CURRENT,
            Err(error) => return Err(error.into()),
        };
        if status == Status::WT_NEW {
            return untracked_diff(&repo, path);
        }

        let head = head_tree(&repo)?;
        let staged = repo.diff_tree_to_index(head.as_ref(), None, Some(&mut pathspec(path)))?;
        let staged_text = patch_text(&staged)?;
        if !staged_text.is_empty() {
            return Ok(staged_text);
        }

        let unstaged = repo.diff_index_to_workdir(None, Some(&mut pathspec(path)))?;
        let unstaged_text = patch_text(&unstaged)?;
        Ok(if unstaged_text.is_empty() {
            NO_CHANGES.to_owned()
        } else {
            unstaged_text
        })
    }

    fn stage(&self, path: &str) -> Result<(), LocalGitError> {
        let repo = self.lock()?;
        let target = Path::new(path);
        let mut index = repo.index()?;
        if repo.status_file(target)?.contains(Status::WT_DELETED) {
            index.remove_path(target)?;
        } else {
            index.add_path(target)?;
        }
        index.write()?;
        tracing::debug!(path, "staged");
        Ok(())
    }

    fn unstage(&self, path: &str) -> Result<(), LocalGitError> {
        let repo = self.lock()?;
        match repo.head() {
            Ok(head) => {
                let commit = head.peel(ObjectType::Commit)?;
                repo.reset_default(Some(&commit), [path])?;
            }
            Err(error) if is_unborn(&error) => {
                let mut index = repo.index()?;
                index.remove_path(Path::new(path))?;
                index.write()?;
            }
            Err(error) => return Err(error.into()),
        }
        tracing::debug!(path, "unstaged");
        Ok(())
    }

    fn commit(&self, message: &str, paths: &[&str]) -> Result<CommitOutcome, LocalGitError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(LocalGitError::EmptyCommitMessage);
        }
        for path in paths {
            self.stage(path)?;
        }

        let repo = self.lock()?;
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(error) if is_unborn(&error) => None,
            Err(error) => return Err(error.into()),
        };
        let unchanged = parent
            .as_ref()
            .map_or_else(|| index.is_empty(), |commit| commit.tree_id() == tree_id);
        if unchanged {
            return Err(LocalGitError::NothingToCommit);
        }

        let tree = repo.find_tree(tree_id)?;
        let signature = repo.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &signature, &signature, text, &tree, &parents)?;

        let outcome = CommitOutcome {
            short_sha: oid.to_string().chars().take(SHORT_SHA_CHARS).collect(),
            summary: text.lines().next().unwrap_or_default().to_owned(),
            branch: branch_name(&repo)?,
        };
        tracing::info!(sha = %outcome.short_sha, branch = %outcome.branch, "committed");
        Ok(outcome)
    }

    fn current_branch(&self) -> Result<String, LocalGitError> {
        let repo = self.lock()?;
        branch_name(&repo)
    }
}

/// A branch without commits, or a repository whose `HEAD` points nowhere.
fn is_unborn(error: &git2::Error) -> bool {
    matches!(error.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

/// The new path for renames, the entry path otherwise.
fn entry_path(entry: &StatusEntry<'_>) -> Option<String> {
    let renamed = entry
        .head_to_index()
        .filter(|_| entry.status().contains(Status::INDEX_RENAMED))
        .and_then(|delta| delta.new_file().path().and_then(Path::to_str).map(ToOwned::to_owned));
    renamed.or_else(|| entry.path().map(ToOwned::to_owned))
}

fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, LocalGitError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_tree()?)),
        Err(error) if is_unborn(&error) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

fn branch_name(repo: &Repository) -> Result<String, LocalGitError> {
    if repo.head_detached()? {
        return Ok(DETACHED_HEAD.to_owned());
    }
    match repo.head() {
        Ok(head) => Ok(head.shorthand().unwrap_or(DETACHED_HEAD).to_owned()),
        Err(error) if is_unborn(&error) => {
            let head = repo.find_reference("HEAD")?;
            Ok(head.symbolic_target().map_or_else(
                || DETACHED_HEAD.to_owned(),
                |target| target.trim_start_matches("refs/heads/").to_owned(),
            ))
        }
        Err(error) => Err(error.into()),
    }
}

/// Diff options restricted to exactly `path`, without glob matching.
fn pathspec(path: &str) -> DiffOptions {
    let mut options = DiffOptions::new();
    options.pathspec(path).disable_pathspec_match(true);
    options
}

fn patch_text(diff: &Diff<'_>) -> Result<String, LocalGitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(text)
}

/// Shows an untracked file as wholly added.
fn untracked_diff(repo: &Repository, path: &str) -> Result<String, LocalGitError> {
    let root = repo.workdir().ok_or_else(|| LocalGitError::BareRepository {
        path: repo.path().display().to_string(),
    })?;
    let io_error = |message: String| LocalGitError::Io {
        path: path.to_owned(),
        message,
    };
    let root_path = Utf8Path::from_path(root)
        .ok_or_else(|| io_error("working directory is not valid UTF-8".to_owned()))?;
    let dir = Dir::open_ambient_dir(root_path, ambient_authority())
        .map_err(|error| io_error(error.to_string()))?;

    let header = format!("New file: {path}\n\n");
    match dir.read_to_string(Utf8Path::new(path)) {
        Ok(content) => Ok(content.lines().fold(header, |mut text, line| {
            text.push('+');
            text.push_str(line);
            text.push('\n');
            text
        })),
        Err(error) if error.kind() == ErrorKind::InvalidData => {
            Ok(format!("{header}(binary content not shown)\n"))
        }
        Err(error) => Err(io_error(error.to_string())),
    }
}
