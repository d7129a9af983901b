//! User settings persisted in the local store's `config` table.
//!
//! [`Settings`] is an explicit value: callers [`Settings::load`] it from a
//! [`LocalStore`], change fields, and [`Settings::save`] it back. Nothing is
//! read implicitly at start-up.

use crate::persistence::{LocalStore, PersistenceError};

/// Keys under which each setting is stored.
pub mod keys {
    /// Slack bot token.
    pub const SLACK_TOKEN: &str = "slack_token";
    /// Name recorded as the sender of dispatched messages.
    pub const SLACK_USER: &str = "slack_user";
    /// Slack workspace host, such as `acme.slack.com`.
    pub const SLACK_WORKSPACE: &str = "slack_workspace";
    /// GitHub personal access token.
    pub const GITHUB_TOKEN: &str = "github_token";
    /// Jira server base URL.
    pub const JIRA_SERVER: &str = "jira_server";
    /// Jira account name.
    pub const JIRA_USERNAME: &str = "jira_username";
    /// Jira API token.
    pub const JIRA_TOKEN: &str = "jira_token";
    /// Last Jira project the user browsed.
    pub const LAST_PROJECT: &str = "last_project";
}

/// Persisted credentials and preferences.
///
/// Absent and blank values both load as `None`; `None` fields are left
/// untouched on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Slack bot token.
    pub slack_token: Option<String>,
    /// Sender name recorded in the notification history.
    pub slack_user: Option<String>,
    /// Slack workspace host.
    pub slack_workspace: Option<String>,
    /// GitHub personal access token.
    pub github_token: Option<String>,
    /// Jira server base URL.
    pub jira_server: Option<String>,
    /// Jira account name.
    pub jira_username: Option<String>,
    /// Jira API token.
    pub jira_token: Option<String>,
    /// Last Jira project key.
    pub last_project: Option<String>,
}

impl Settings {
    /// Reads every setting from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the store cannot be read.
    pub fn load(store: &LocalStore) -> Result<Self, PersistenceError> {
        let read = |key: &str| -> Result<Option<String>, PersistenceError> {
            Ok(store
                .get_config(key)?
                .filter(|value| !value.trim().is_empty()))
        };

        Ok(Self {
            slack_token: read(keys::SLACK_TOKEN)?,
            slack_user: read(keys::SLACK_USER)?,
            slack_workspace: read(keys::SLACK_WORKSPACE)?,
            github_token: read(keys::GITHUB_TOKEN)?,
            jira_server: read(keys::JIRA_SERVER)?,
            jira_username: read(keys::JIRA_USERNAME)?,
            jira_token: read(keys::JIRA_TOKEN)?,
            last_project: read(keys::LAST_PROJECT)?,
        })
    }

    /// Writes every present setting to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on the first failed write.
    pub fn save(&self, store: &LocalStore) -> Result<(), PersistenceError> {
        for (key, value) in self.entries() {
            if let Some(present) = value {
                store.set_config(key, present)?;
            }
        }
        tracing::debug!("settings saved");
        Ok(())
    }

    fn entries(&self) -> [(&'static str, Option<&str>); 8] {
        [
            (keys::SLACK_TOKEN, self.slack_token.as_deref()),
            (keys::SLACK_USER, self.slack_user.as_deref()),
            (keys::SLACK_WORKSPACE, self.slack_workspace.as_deref()),
            (keys::GITHUB_TOKEN, self.github_token.as_deref()),
            (keys::JIRA_SERVER, self.jira_server.as_deref()),
            (keys::JIRA_USERNAME, self.jira_username.as_deref()),
            (keys::JIRA_TOKEN, self.jira_token.as_deref()),
            (keys::LAST_PROJECT, self.last_project.as_deref()),
        ]
    }
}
