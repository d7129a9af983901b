//! Error types exposed by the Jira layer.

use thiserror::Error;

/// Errors surfaced while talking to a Jira server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JiraError {
    /// An operation ran before [`crate::jira::IssueTracker::connect`]
    /// succeeded.
    #[error("not connected to Jira")]
    NotConnected,

    /// Jira rejected the username or API token.
    #[error("Jira rejected the credentials: {message}")]
    Authentication {
        /// Error detail returned with the 401/403 response.
        message: String,
    },

    /// Jira returned a non-authentication error response.
    #[error("Jira API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error messages reported by Jira, or the truncated body.
        message: String,
    },

    /// Networking failed while calling Jira.
    #[error("network error talking to Jira: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body did not have the expected shape.
    #[error("unexpected Jira response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Connection settings were missing or unusable.
    #[error("Jira configuration error: {message}")]
    Configuration {
        /// What is wrong with the settings.
        message: String,
    },
}
