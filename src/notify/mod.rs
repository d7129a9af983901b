//! Message dispatch to a chat provider.
//!
//! The [`MessagingProvider`] trait is the narrow capability the rest of the
//! crate depends on; [`SlackClient`] is its only production implementation.
//! [`Dispatcher`] layers report validation and the audit trail on top.

mod dispatcher;
mod error;
mod slack;

pub use dispatcher::{Dispatcher, UNKNOWN_SENDER};
pub use error::DispatchError;
pub use slack::{SlackClient, SlackClientConfig, build_report_blocks};

use async_trait::async_trait;
use serde::Serialize;

use crate::persistence::SlackUser;

/// A conversation the provider can post into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    /// Provider identifier, usable as a destination.
    pub id: String,
    /// Human-readable channel name without the leading `#`.
    pub name: String,
    /// Whether the channel is private.
    pub is_private: bool,
}

/// The operations QA Generator needs from a chat provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Posts plain text to a channel or user.
    async fn send_message(&self, text: &str, destination: &str) -> Result<bool, DispatchError>;

    /// Posts pre-built structured blocks to a channel or user.
    async fn send_structured_message(
        &self,
        blocks: &[serde_json::Value],
        destination: &str,
    ) -> Result<bool, DispatchError>;

    /// Lists public and private channels visible to the token.
    async fn list_channels(&self) -> Result<Vec<Channel>, DispatchError>;

    /// Lists human, non-deleted workspace members.
    async fn list_users(&self) -> Result<Vec<SlackUser>, DispatchError>;

    /// Checks that the credentials are accepted.
    async fn test_connection(&self) -> Result<bool, DispatchError>;
}
