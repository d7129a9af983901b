//! Slack Web API implementation of [`MessagingProvider`].

mod blocks;

pub use blocks::build_report_blocks;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{Channel, DispatchError, MessagingProvider};
use crate::http_body::truncate_for_message;
use crate::persistence::SlackUser;

const DEFAULT_WORKSPACE: &str = "slack.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const AUTH_TEST_TIMEOUT_SECS: u64 = 10;
const ERROR_BODY_CHARS: usize = 160;

/// Connection settings for [`SlackClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackClientConfig {
    /// Web API base, e.g. `https://slack.com/api`.
    pub api_base: String,
    /// Bot token sent as a bearer credential.
    pub token: String,
    /// Timeout applied to every call except `auth.test`.
    pub timeout: Duration,
    /// Timeout applied to `auth.test`.
    pub auth_timeout: Duration,
}

impl SlackClientConfig {
    /// Targets `https://{workspace}/api`, defaulting to `slack.com`.
    #[must_use]
    pub fn new(token: impl Into<String>, workspace: Option<&str>) -> Self {
        let host = workspace
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_WORKSPACE);
        Self {
            api_base: format!("https://{host}/api"),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_timeout: Duration::from_secs(AUTH_TEST_TIMEOUT_SECS),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Slack Web API client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    config: SlackClientConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Default, Deserialize)]
struct NoPayload {}

#[derive(Debug, Default, Deserialize)]
struct ChannelsPayload {
    #[serde(default)]
    channels: Vec<RawChannel>,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_private: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MembersPayload {
    #[serde(default)]
    members: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    deleted: bool,
}

impl SlackClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] when the token is blank or
    /// the HTTP client cannot be built.
    pub fn new(config: SlackClientConfig) -> Result<Self, DispatchError> {
        if config.token.trim().is_empty() {
            return Err(DispatchError::Configuration {
                message: concat!(
                    "Slack token is required (use --slack-token, ",
                    "QA_GENERATOR_SLACK_TOKEN, or the saved settings)"
                )
                .to_owned(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| DispatchError::Configuration {
                message: format!("failed to configure Slack HTTP client: {error}"),
            })?;

        Ok(Self { config, http })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.config.api_base.trim_end_matches('/'))
    }

    async fn call<T>(&self, method: &str, request: RequestBuilder) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|error| {
                tracing::warn!(method, %error, "Slack request failed");
                DispatchError::Network {
                    message: format!("{method} transport failed: {error}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), ERROR_BODY_CHARS),
            );
            return Err(DispatchError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: SlackEnvelope<T> =
            response
                .json()
                .await
                .map_err(|error| DispatchError::Decode {
                    message: format!("{method} response decoding failed: {error}"),
                })?;

        if envelope.ok {
            Ok(envelope.payload)
        } else {
            Err(DispatchError::Provider {
                message: envelope.error.unwrap_or_else(|| "Unknown error".to_owned()),
            })
        }
    }

    async fn post_message(&self, payload: serde_json::Value) -> Result<bool, DispatchError> {
        let request = self.http.post(self.endpoint("chat.postMessage")).json(&payload);
        self.call::<NoPayload>("chat.postMessage", request)
            .await
            .map(|_| true)
    }
}

#[async_trait]
impl MessagingProvider for SlackClient {
    async fn send_message(&self, text: &str, destination: &str) -> Result<bool, DispatchError> {
        self.post_message(json!({ "channel": destination, "text": text }))
            .await
    }

    async fn send_structured_message(
        &self,
        blocks: &[serde_json::Value],
        destination: &str,
    ) -> Result<bool, DispatchError> {
        self.post_message(json!({ "channel": destination, "blocks": blocks }))
            .await
    }

    async fn list_channels(&self) -> Result<Vec<Channel>, DispatchError> {
        let request = self
            .http
            .get(self.endpoint("conversations.list"))
            .query(&[("types", "public_channel,private_channel")]);
        let payload: ChannelsPayload = self.call("conversations.list", request).await?;

        Ok(payload
            .channels
            .into_iter()
            .map(|raw| Channel {
                id: raw.id,
                name: raw.name,
                is_private: raw.is_private,
            })
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<SlackUser>, DispatchError> {
        let request = self.http.get(self.endpoint("users.list"));
        let payload: MembersPayload = self.call("users.list", request).await?;

        Ok(payload
            .members
            .into_iter()
            .filter(|member| !member.is_bot && !member.deleted)
            .map(|member| SlackUser {
                id: member.id,
                username: member.name,
                real_name: member.real_name.unwrap_or_default(),
            })
            .collect())
    }

    async fn test_connection(&self) -> Result<bool, DispatchError> {
        let request = self
            .http
            .get(self.endpoint("auth.test"))
            .timeout(self.config.auth_timeout);
        match self.call::<NoPayload>("auth.test", request).await {
            Ok(_) => Ok(true),
            Err(DispatchError::Provider { message }) => {
                tracing::info!(error = %message, "Slack rejected the credentials");
                Ok(false)
            }
            Err(DispatchError::Http { status, .. }) => {
                tracing::info!(status, "Slack auth.test returned an HTTP error");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests;
