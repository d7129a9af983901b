//! Slack workspace listings, the cached user directory and the connection
//! check.

use qa_generator::notify::MessagingProvider;
use qa_generator::persistence::SlackUser;
use qa_generator::{QaGeneratorConfig, SlackClient};

use super::Session;
use super::error::CliError;
use super::output::{to_stdout, write_channels, write_text, write_users};

/// Lists channels the bot can see.
pub async fn list_channels(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let client = SlackClient::new(config.resolve_slack(&session.settings)?)?;
    let channels = client.list_channels().await?;
    to_stdout(|stdout| write_channels(stdout, &channels))
}

/// Lists workspace members and refreshes the local user cache.
pub async fn list_users(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let client = SlackClient::new(config.resolve_slack(&session.settings)?)?;
    let users = client.list_users().await?;
    session.store.save_slack_users(&users)?;
    tracing::info!(count = users.len(), "Slack user cache refreshed");
    to_stdout(|stdout| write_users(stdout, &users))
}

/// Prints the users cached by the last listing, without contacting Slack.
pub fn cached_users(session: &Session) -> Result<(), CliError> {
    let users = session.store.list_slack_users()?;
    if users.is_empty() {
        return to_stdout(|stdout| {
            write_text(stdout, "No cached Slack users; run --list-users first.")
        });
    }
    to_stdout(|stdout| write_users(stdout, &users))
}

/// Checks the configured token with Slack.
pub async fn test_connection(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let client = SlackClient::new(config.resolve_slack(&session.settings)?)?;
    if client.test_connection().await? {
        to_stdout(|stdout| write_text(stdout, "Slack connection: connected"))
    } else {
        Err(CliError::Configuration {
            message: "Slack connection: rejected (check --slack-token)".to_owned(),
        })
    }
}

/// Turns `@name` into the id of the matching cached user; any other
/// destination is returned unchanged.
pub fn resolve_destination(session: &Session, destination: &str) -> Result<String, CliError> {
    let Some(name) = destination.strip_prefix('@') else {
        return Ok(destination.to_owned());
    };
    let users = session.store.list_slack_users()?;
    find_user(&users, name)
        .map(|user| user.id.clone())
        .ok_or_else(|| CliError::Configuration {
            message: format!("no cached Slack user named @{name}; run --list-users first"),
        })
}

/// Matches the username first, then the real name, ignoring case.
fn find_user<'a>(users: &'a [SlackUser], name: &str) -> Option<&'a SlackUser> {
    users
        .iter()
        .find(|user| user.username.eq_ignore_ascii_case(name))
        .or_else(|| {
            users
                .iter()
                .find(|user| !user.real_name.is_empty() && user.real_name.eq_ignore_ascii_case(name))
        })
}
