//! Gateway for the GitHub REST operations QA Generator uses.
//!
//! [`HostingGateway`] exposes one method per REST call so tests can stub
//! GitHub with `mockall`; [`OctocrabHostingGateway`] performs the calls.

mod client;
mod error_mapping;
mod hosting;

pub use hosting::OctocrabHostingGateway;

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::RepositoryRef;
use crate::github::models::{
    Branch, CommitSummary, GitHubUser, Organization, Repository, RepositoryIssue,
};

/// Source-control hosting operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostingGateway: Send + Sync {
    /// Fetch the account that owns the token.
    async fn authenticated_user(&self) -> Result<GitHubUser, GitHubError>;

    /// List the user's repositories, most recently updated first.
    async fn user_repositories(&self) -> Result<Vec<Repository>, GitHubError>;

    /// List the user's organisations.
    async fn organizations(&self) -> Result<Vec<Organization>, GitHubError>;

    /// List an organisation's repositories, most recently updated first.
    async fn organization_repositories(
        &self,
        organization: &str,
    ) -> Result<Vec<Repository>, GitHubError>;

    /// Fetch one repository.
    async fn repository(&self, repo: &RepositoryRef) -> Result<Repository, GitHubError>;

    /// List branch names only, in API order.
    async fn branch_names(&self, repo: &RepositoryRef) -> Result<Vec<String>, GitHubError>;

    /// Fetch the newest commit on the default branch; `Ok(None)` for an
    /// empty repository.
    async fn latest_commit(&self, repo: &RepositoryRef)
    -> Result<Option<CommitSummary>, GitHubError>;

    /// List up to `limit` open issues, newest first, skipping pull requests.
    async fn open_issues(
        &self,
        repo: &RepositoryRef,
        limit: usize,
    ) -> Result<Vec<RepositoryIssue>, GitHubError>;

    /// List branches with their head commit details, in API order.
    async fn branches(&self, repo: &RepositoryRef) -> Result<Vec<Branch>, GitHubError>;

    /// Fetch one branch; `Ok(None)` when it does not exist.
    async fn branch(&self, repo: &RepositoryRef, name: &str)
    -> Result<Option<Branch>, GitHubError>;

    /// Create `refs/heads/{name}` pointing at `sha`.
    async fn create_branch_ref(
        &self,
        repo: &RepositoryRef,
        name: &str,
        sha: &str,
    ) -> Result<(), GitHubError>;

    /// Delete `refs/heads/{name}`.
    async fn delete_branch_ref(&self, repo: &RepositoryRef, name: &str)
    -> Result<(), GitHubError>;
}
