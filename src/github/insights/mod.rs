//! Repository summaries on top of a [`HostingGateway`].

use crate::github::error::GitHubError;
use crate::github::gateway::HostingGateway;
use crate::github::locator::RepositoryRef;
use crate::github::models::{RepositoryDetails, RepositoryIssue};

/// Open issues listed when the caller does not ask for a number.
pub const DEFAULT_ISSUE_LIMIT: usize = 10;

/// Read-only repository views for one gateway.
pub struct RepositoryInsights<'a> {
    gateway: &'a dyn HostingGateway,
}

impl<'a> RepositoryInsights<'a> {
    /// Wraps `gateway`.
    #[must_use]
    pub const fn new(gateway: &'a dyn HostingGateway) -> Self {
        Self { gateway }
    }

    /// Collects the repository statistics, its branch names and the latest
    /// commit.
    ///
    /// A failure to list branches or commits is logged and leaves that part
    /// empty; only the repository lookup itself is fatal.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure of the repository lookup.
    pub async fn details(&self, repo: &RepositoryRef) -> Result<RepositoryDetails, GitHubError> {
        let repository = self.gateway.repository(repo).await?;

        let branch_names = self
            .gateway
            .branch_names(repo)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(repository = %repo.full_name(), %error, "branch names unavailable");
                Vec::new()
            });
        let latest_commit = self
            .gateway
            .latest_commit(repo)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(repository = %repo.full_name(), %error, "latest commit unavailable");
                None
            });

        Ok(RepositoryDetails {
            repository,
            branch_names,
            latest_commit,
        })
    }

    /// Lists up to `limit` open issues, newest first; a zero `limit` uses
    /// [`DEFAULT_ISSUE_LIMIT`].
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn open_issues(
        &self,
        repo: &RepositoryRef,
        limit: usize,
    ) -> Result<Vec<RepositoryIssue>, GitHubError> {
        let effective = if limit == 0 { DEFAULT_ISSUE_LIMIT } else { limit };
        self.gateway.open_issues(repo, effective).await
    }
}
