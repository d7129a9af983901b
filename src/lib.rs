//! QA Generator library crate: QA hand-off reports and their delivery.
//!
//! A [`report::QaReport`] collects what a reviewer needs to test a change:
//! the task title, its tracker link, the environments and pull requests it
//! is deployed with, per-kind review instructions and the reviewers. The
//! crate renders reports as text, delivers them to Slack with an audit
//! trail in a local `SQLite` store, and wraps the GitHub, Jira and local
//! Git operations used while preparing them.

pub mod config;
pub mod github;
mod http_body;
pub mod jira;
pub mod local;
pub mod notify;
pub mod persistence;
pub mod report;
pub mod settings;
pub mod tasks;
pub mod telemetry;
mod url_path;

pub use config::{OperationMode, QaGeneratorConfig};
pub use github::{BranchService, GitHubError, OctocrabHostingGateway, PersonalAccessToken};
pub use jira::{IssueTracker, JiraClient, JiraError};
pub use local::{Git2WorkingCopy, LocalGitError, WorkingCopy};
pub use notify::{DispatchError, Dispatcher, MessagingProvider, SlackClient};
pub use persistence::{LocalStore, PersistenceError};
pub use report::{QaKind, QaReport, ValidationError};
pub use settings::Settings;
