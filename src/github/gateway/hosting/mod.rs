//! Octocrab implementation of [`HostingGateway`].

use async_trait::async_trait;
use http::Uri;
use octocrab::{Octocrab, Page};
use serde_json::json;

use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, RepositoryRef};
use crate::github::models::{
    ApiBranch, ApiCommit, ApiIssue, ApiOrganization, ApiRepository, ApiUser, Branch,
    CommitSummary, GitHubUser, Organization, Repository, RepositoryIssue,
};
use crate::url_path::{encode_segments, encode_slashed};

use super::HostingGateway;
use super::client::build_octocrab_client;
use super::error_mapping::{
    extract_github_message, is_empty_repository, is_not_found, map_http_error, map_octocrab_error,
};

const REPOSITORY_PAGE_SIZE: &str = "30";
const BRANCH_PAGE_SIZE: &str = "100";
/// Pull requests share the issues listing, so a full page is fetched before
/// filtering down to the requested number of issues.
const ISSUE_PAGE_SIZE: &str = "100";

/// Octocrab-backed hosting gateway.
pub struct OctocrabHostingGateway {
    client: Octocrab,
}

impl OctocrabHostingGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for `token` against `api_base`
    /// (`https://api.github.com` or an Enterprise `/api/v3` URL).
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidRepository` when the base URI cannot be
    /// parsed or `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, GitHubError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }

    /// Builds a gateway and verifies the token by fetching the user.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::Authentication` when GitHub rejects the token,
    /// or any error from [`OctocrabHostingGateway::for_token`].
    pub async fn connect(
        token: &PersonalAccessToken,
        api_base: &str,
    ) -> Result<(Self, GitHubUser), GitHubError> {
        let gateway = Self::for_token(token, api_base)?;
        let user = gateway.authenticated_user().await?;
        tracing::info!(login = %user.login, "authenticated with GitHub");
        Ok((gateway, user))
    }

    async fn list_repositories(
        &self,
        operation: &str,
        path: &str,
    ) -> Result<Vec<Repository>, GitHubError> {
        let query = [("sort", "updated"), ("per_page", REPOSITORY_PAGE_SIZE)];
        self.client
            .get::<Vec<ApiRepository>, _, _>(path, Some(&query))
            .await
            .map(|repositories| repositories.into_iter().map(Repository::from).collect())
            .map_err(|error| map_octocrab_error(operation, &error))
    }

    async fn head_commit(&self, repo: &RepositoryRef, sha: &str) -> Option<ApiCommit> {
        let path = repo.api_path(&format!("/commits/{sha}"));
        match self
            .client
            .get::<ApiCommit, _, _>(path, None::<&()>)
            .await
        {
            Ok(commit) => Some(commit),
            Err(error) => {
                tracing::debug!(sha, %error, "could not load head commit details");
                None
            }
        }
    }
}

#[async_trait]
impl HostingGateway for OctocrabHostingGateway {
    async fn authenticated_user(&self) -> Result<GitHubUser, GitHubError> {
        self.client
            .get::<ApiUser, _, _>("/user", None::<&()>)
            .await
            .map(GitHubUser::from)
            .map_err(|error| map_octocrab_error("authenticated user", &error))
    }

    async fn user_repositories(&self) -> Result<Vec<Repository>, GitHubError> {
        self.list_repositories("list repositories", "/user/repos")
            .await
    }

    async fn organizations(&self) -> Result<Vec<Organization>, GitHubError> {
        self.client
            .get::<Vec<ApiOrganization>, _, _>("/user/orgs", None::<&()>)
            .await
            .map(|organizations| organizations.into_iter().map(Organization::from).collect())
            .map_err(|error| map_octocrab_error("list organizations", &error))
    }

    async fn organization_repositories(
        &self,
        organization: &str,
    ) -> Result<Vec<Repository>, GitHubError> {
        let path = format!("/orgs/{}/repos", encode_segments([organization]));
        self.list_repositories("list organization repositories", &path)
            .await
    }

    async fn repository(&self, repo: &RepositoryRef) -> Result<Repository, GitHubError> {
        self.client
            .get::<ApiRepository, _, _>(repo.api_path(""), None::<&()>)
            .await
            .map(Repository::from)
            .map_err(|error| map_octocrab_error("repository", &error))
    }

    async fn branch_names(&self, repo: &RepositoryRef) -> Result<Vec<String>, GitHubError> {
        let query = [("per_page", BRANCH_PAGE_SIZE)];
        let first_page: Page<ApiBranch> = self
            .client
            .get(repo.api_path("/branches"), Some(&query))
            .await
            .map_err(|error| map_octocrab_error("list branch names", &error))?;
        let api_branches = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|error| map_octocrab_error("list branch names", &error))?;
        Ok(api_branches.into_iter().map(|branch| branch.name).collect())
    }

    async fn latest_commit(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Option<CommitSummary>, GitHubError> {
        let query = [("per_page", "1")];
        match self
            .client
            .get::<Vec<ApiCommit>, _, _>(repo.api_path("/commits"), Some(&query))
            .await
        {
            Ok(commits) => Ok(commits.into_iter().next().map(CommitSummary::from)),
            Err(error) if is_empty_repository(&error) => Ok(None),
            Err(error) => Err(map_octocrab_error("latest commit", &error)),
        }
    }

    async fn open_issues(
        &self,
        repo: &RepositoryRef,
        limit: usize,
    ) -> Result<Vec<RepositoryIssue>, GitHubError> {
        let query = [
            ("state", "open"),
            ("sort", "created"),
            ("direction", "desc"),
            ("per_page", ISSUE_PAGE_SIZE),
        ];
        let api_issues = self
            .client
            .get::<Vec<ApiIssue>, _, _>(repo.api_path("/issues"), Some(&query))
            .await
            .map_err(|error| map_octocrab_error("list issues", &error))?;
        Ok(api_issues
            .into_iter()
            .filter_map(ApiIssue::into_issue)
            .take(limit)
            .collect())
    }

    async fn branches(&self, repo: &RepositoryRef) -> Result<Vec<Branch>, GitHubError> {
        let query = [("per_page", BRANCH_PAGE_SIZE)];
        let first_page: Page<ApiBranch> = self
            .client
            .get(repo.api_path("/branches"), Some(&query))
            .await
            .map_err(|error| map_octocrab_error("list branches", &error))?;
        let api_branches = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|error| map_octocrab_error("list branches", &error))?;

        let mut branches = Vec::with_capacity(api_branches.len());
        for api_branch in api_branches {
            let detail = if api_branch.commit.commit.is_some() {
                None
            } else {
                self.head_commit(repo, &api_branch.commit.sha)
                    .await
                    .and_then(|commit| commit.commit)
            };
            branches.push(api_branch.into_branch(detail));
        }
        Ok(branches)
    }

    async fn branch(
        &self,
        repo: &RepositoryRef,
        name: &str,
    ) -> Result<Option<Branch>, GitHubError> {
        let path = repo.api_path(&format!("/branches/{}", encode_slashed(name)));
        match self.client.get::<ApiBranch, _, _>(path, None::<&()>).await {
            Ok(api_branch) => Ok(Some(api_branch.into_branch(None))),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(map_octocrab_error("branch", &error)),
        }
    }

    async fn create_branch_ref(
        &self,
        repo: &RepositoryRef,
        name: &str,
        sha: &str,
    ) -> Result<(), GitHubError> {
        let body = json!({ "ref": format!("refs/heads/{name}"), "sha": sha });
        let _created: serde_json::Value = self
            .client
            .post(repo.api_path("/git/refs"), Some(&body))
            .await
            .map_err(|error| map_octocrab_error("create branch", &error))?;
        tracing::info!(repository = %repo.full_name(), branch = name, "branch created");
        Ok(())
    }

    async fn delete_branch_ref(&self, repo: &RepositoryRef, name: &str) -> Result<(), GitHubError> {
        let path = repo.api_path(&format!("/git/refs/heads/{}", encode_slashed(name)));
        let uri: Uri = path
            .parse::<Uri>()
            .map_err(|error| GitHubError::InvalidBranchName {
                reason: error.to_string(),
            })?;

        let response = match self.client._delete(uri, None::<&()>).await {
            Ok(response) => response,
            Err(error) if is_not_found(&error) => {
                return Err(GitHubError::BranchNotFound {
                    name: name.to_owned(),
                });
            }
            Err(error) => return Err(map_octocrab_error("delete branch", &error)),
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!(repository = %repo.full_name(), branch = name, "branch deleted");
            return Ok(());
        }
        if status == http::StatusCode::NOT_FOUND {
            return Err(GitHubError::BranchNotFound {
                name: name.to_owned(),
            });
        }

        let body = self
            .client
            .body_to_string(response)
            .await
            .unwrap_or_else(|_| String::new());
        Err(map_http_error(
            "delete branch",
            status,
            extract_github_message(&body),
        ))
    }
}
