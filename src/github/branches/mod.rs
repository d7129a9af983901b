//! Branch management on top of a [`HostingGateway`].

use crate::github::branch_name::{sanitize_branch_name, validate_branch_name};
use crate::github::error::GitHubError;
use crate::github::gateway::HostingGateway;
use crate::github::locator::RepositoryRef;
use crate::github::models::Branch;

/// Highest numeric suffix tried before falling back to a random one.
pub const MAX_NUMBERED_SUGGESTIONS: u32 = 100;

/// Validated branch operations for one gateway.
pub struct BranchService<'a> {
    gateway: &'a dyn HostingGateway,
}

impl<'a> BranchService<'a> {
    /// Wraps `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a dyn HostingGateway) -> Self {
        Self { gateway }
    }

    /// Lists branches ordered by head commit date, newest first. Branches
    /// whose commit date is unknown sort last.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn list_branches(&self, repo: &RepositoryRef) -> Result<Vec<Branch>, GitHubError> {
        let mut branches = self.gateway.branches(repo).await?;
        branches.sort_by(|left, right| right.last_commit_date.cmp(&left.last_commit_date));
        Ok(branches)
    }

    /// Whether `name` exists in `repo`.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures other than "not found".
    pub async fn branch_exists(&self, repo: &RepositoryRef, name: &str) -> Result<bool, GitHubError> {
        Ok(self.gateway.branch(repo, name).await?.is_some())
    }

    /// The repository's default branch.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn default_branch(&self, repo: &RepositoryRef) -> Result<String, GitHubError> {
        Ok(self.gateway.repository(repo).await?.default_branch)
    }

    /// Creates `name` from `source`, or from the default branch when
    /// `source` is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidBranchName` when `name` breaks a naming
    /// rule, `BranchExists` when it is taken, `BranchNotFound` when the
    /// source branch is missing, or a gateway failure.
    pub async fn create_branch(
        &self,
        repo: &RepositoryRef,
        name: &str,
        source: Option<&str>,
    ) -> Result<Branch, GitHubError> {
        validate_branch_name(name)?;
        let branch_name = name.trim();

        if self.branch_exists(repo, branch_name).await? {
            return Err(GitHubError::BranchExists {
                name: branch_name.to_owned(),
            });
        }

        let source_name = match source.map(str::trim).filter(|value| !value.is_empty()) {
            Some(explicit) => explicit.to_owned(),
            None => self.default_branch(repo).await?,
        };
        let Some(source_branch) = self.gateway.branch(repo, &source_name).await? else {
            return Err(GitHubError::BranchNotFound { name: source_name });
        };

        self.gateway
            .create_branch_ref(repo, branch_name, &source_branch.sha)
            .await?;

        Ok(Branch {
            name: branch_name.to_owned(),
            ..source_branch
        })
    }

    /// Deletes `name` unless it is the default branch.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::ProtectedDefaultBranch` for the default branch,
    /// `BranchNotFound` when it does not exist, or a gateway failure.
    pub async fn delete_branch(&self, repo: &RepositoryRef, name: &str) -> Result<(), GitHubError> {
        let branch_name = name.trim();
        if branch_name == self.default_branch(repo).await? {
            return Err(GitHubError::ProtectedDefaultBranch {
                name: branch_name.to_owned(),
            });
        }

        if !self.branch_exists(repo, branch_name).await? {
            return Err(GitHubError::BranchNotFound {
                name: branch_name.to_owned(),
            });
        }

        self.gateway.delete_branch_ref(repo, branch_name).await
    }

    /// Suggests an unused branch name derived from `base`.
    ///
    /// The sanitised base is returned when free; otherwise `-1` to `-100`
    /// suffixes are tried in turn, then a random eight-character suffix.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn suggest_branch_name(
        &self,
        repo: &RepositoryRef,
        base: &str,
    ) -> Result<String, GitHubError> {
        let candidate = sanitize_branch_name(base);
        if !self.branch_exists(repo, &candidate).await? {
            return Ok(candidate);
        }

        for counter in 1..=MAX_NUMBERED_SUGGESTIONS {
            let numbered = format!("{candidate}-{counter}");
            if !self.branch_exists(repo, &numbered).await? {
                return Ok(numbered);
            }
        }

        let random = uuid::Uuid::new_v4().simple().to_string();
        let suffix = random.get(..8).unwrap_or(random.as_str());
        Ok(format!("{candidate}-{suffix}"))
    }
}
