//! GitHub data returned to callers.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SHORT_SHA_CHARS: usize = 7;

/// The authenticated account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitHubUser {
    /// Login handle.
    pub login: String,
    /// Display name, falling back to the login.
    pub name: String,
    /// Public e-mail, when shared.
    pub email: Option<String>,
    /// Number of public repositories.
    pub public_repos: u64,
}

/// A repository summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Short name.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// Description, when set.
    pub description: Option<String>,
    /// Whether the repository is private.
    pub private: bool,
    /// Primary language, when detected.
    pub language: Option<String>,
    /// Default branch name.
    pub default_branch: String,
    /// Browser URL.
    pub html_url: String,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// HTTPS clone URL.
    pub clone_url: Option<String>,
    /// Stargazer count.
    pub stars: u64,
    /// Watcher count.
    pub watchers: u64,
    /// Fork count.
    pub forks: u64,
    /// Open issues and pull requests, as counted by GitHub.
    pub open_issues: u64,
    /// Repository size in kilobytes.
    pub size_kb: u64,
}

/// A repository with its branch names and latest commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryDetails {
    /// Repository summary and statistics.
    pub repository: Repository,
    /// Branch names in API order.
    pub branch_names: Vec<String>,
    /// Newest commit on the default branch, when the repository has one.
    pub latest_commit: Option<CommitSummary>,
}

/// The newest commit of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Abbreviated SHA (seven characters).
    pub short_sha: String,
    /// First line of the message.
    pub summary: String,
    /// Author name, when recorded.
    pub author: Option<String>,
    /// Author date, when recorded.
    pub date: Option<DateTime<Utc>>,
}

/// An open issue; pull requests are never represented as issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryIssue {
    /// Issue number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// `open` or `closed`.
    pub state: String,
    /// Login of the author.
    pub author: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Browser URL.
    pub html_url: String,
}

/// An organisation the user belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Login handle.
    pub login: String,
    /// Description, when set.
    pub description: Option<String>,
}

/// A branch with details of its head commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Head commit SHA.
    pub sha: String,
    /// Whether branch protection is enabled.
    pub protected: bool,
    /// Head commit author date, when it could be loaded.
    pub last_commit_date: Option<DateTime<Utc>>,
    /// Head commit author name.
    pub last_commit_author: Option<String>,
    /// First line of the head commit message.
    pub last_commit_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    public_repos: u64,
}

impl From<ApiUser> for GitHubUser {
    fn from(api: ApiUser) -> Self {
        let name = api
            .name
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| api.login.clone());
        Self {
            login: api.login,
            name,
            email: api.email,
            public_repos: api.public_repos,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepository {
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    clone_url: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    size: u64,
}

impl From<ApiRepository> for Repository {
    fn from(api: ApiRepository) -> Self {
        Self {
            name: api.name,
            full_name: api.full_name,
            description: api.description,
            private: api.private,
            language: api.language,
            default_branch: api.default_branch.unwrap_or_else(|| "main".to_owned()),
            html_url: api.html_url.unwrap_or_default(),
            updated_at: api.updated_at,
            created_at: api.created_at,
            clone_url: api.clone_url,
            stars: api.stargazers_count,
            watchers: api.watchers_count,
            forks: api.forks_count,
            open_issues: api.open_issues_count,
            size_kb: api.size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiOrganization {
    login: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<ApiOrganization> for Organization {
    fn from(api: ApiOrganization) -> Self {
        Self {
            login: api.login,
            description: api.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranch {
    pub(crate) name: String,
    pub(crate) commit: ApiBranchCommit,
    #[serde(default)]
    pub(crate) protected: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranchCommit {
    pub(crate) sha: String,
    #[serde(default)]
    pub(crate) commit: Option<ApiCommitDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    #[serde(default)]
    pub(crate) sha: String,
    #[serde(default)]
    pub(crate) commit: Option<ApiCommitDetail>,
}

impl From<ApiCommit> for CommitSummary {
    fn from(api: ApiCommit) -> Self {
        let short_sha = api.sha.chars().take(SHORT_SHA_CHARS).collect();
        let (summary, author, date) = api.commit.map_or_else(
            || (String::new(), None, None),
            |detail| {
                let summary = detail.message.lines().next().unwrap_or_default().to_owned();
                let (date, author) = detail
                    .author
                    .map_or((None, None), |found| (found.date, found.name));
                (summary, author, date)
            },
        );
        Self {
            short_sha,
            summary,
            author,
            date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIssue {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    user: Option<ApiIssueUser>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiIssueUser {
    login: String,
}

impl ApiIssue {
    /// Converts into a [`RepositoryIssue`]; `None` for pull requests, which
    /// the issues endpoint lists alongside issues.
    pub(crate) fn into_issue(self) -> Option<RepositoryIssue> {
        if self.pull_request.is_some() {
            return None;
        }
        Some(RepositoryIssue {
            number: self.number,
            title: self.title,
            state: self.state,
            author: self.user.map_or_else(|| "unknown".to_owned(), |user| user.login),
            created_at: self.created_at,
            html_url: self.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommitDetail {
    #[serde(default)]
    author: Option<ApiCommitAuthor>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiCommitAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl ApiBranch {
    /// Converts into a [`Branch`], taking commit details from `detail` when
    /// the listing did not embed them.
    pub(crate) fn into_branch(self, detail: Option<ApiCommitDetail>) -> Branch {
        let commit_detail = self.commit.commit.or(detail);
        let (last_commit_date, last_commit_author, last_commit_message) = commit_detail
            .map_or((None, None, None), |found| {
                let message = found.message.lines().next().map(ToOwned::to_owned);
                let (date, author) = found
                    .author
                    .map_or((None, None), |author| (author.date, author.name));
                (date, author, message)
            });
        Branch {
            name: self.name,
            sha: self.commit.sha,
            protected: self.protected,
            last_commit_date,
            last_commit_author,
            last_commit_message,
        }
    }
}
