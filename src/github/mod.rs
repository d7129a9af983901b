//! GitHub repository and branch management.
//!
//! This module wraps Octocrab to validate personal access tokens, list the
//! repositories and organisations a user can reach, summarise a repository
//! and its open issues, and create or delete branches under the naming rules
//! GitHub enforces. Errors are mapped into user-friendly variants so callers
//! never see Octocrab internals.

pub mod branch_name;
pub mod branches;
pub mod error;
pub mod gateway;
pub mod insights;
pub mod locator;
pub mod models;

pub use branch_name::{MAX_BRANCH_NAME_CHARS, sanitize_branch_name, validate_branch_name};
pub use branches::{BranchService, MAX_NUMBERED_SUGGESTIONS};
pub use insights::{DEFAULT_ISSUE_LIMIT, RepositoryInsights};
pub use error::GitHubError;
pub use gateway::{HostingGateway, OctocrabHostingGateway};
pub use locator::{PersonalAccessToken, RepositoryRef};
pub use models::{
    Branch, CommitSummary, GitHubUser, Organization, Repository, RepositoryDetails,
    RepositoryIssue,
};

#[cfg(test)]
pub use gateway::MockHostingGateway;
