//! Rendering, sending and history operations.

use qa_generator::report::{QaReport, render_slack_summary, render_with_template};
use qa_generator::telemetry::StderrJsonlTelemetrySink;
use qa_generator::{Dispatcher, QaGeneratorConfig, SlackClient};

use super::error::CliError;
use super::input::{load_report, read_text_file};
use super::output::{to_stdout, write_history, write_text};
use super::slack::resolve_destination;
use super::{Session, require};

/// Renders the report file to stdout.
pub fn render(config: &QaGeneratorConfig) -> Result<(), CliError> {
    let report = load_report(config.require_report_file()?)?;
    let text = render_report(config, &report)?;
    to_stdout(|stdout| write_text(stdout, text.trim_end_matches('\n')))
}

/// Picks the rendering selected by the configuration.
fn render_report(config: &QaGeneratorConfig, report: &QaReport) -> Result<String, CliError> {
    if let Some(path) = config.template_file.as_deref() {
        let source = read_text_file(path, "template file")?;
        return Ok(render_with_template(report, &source)?);
    }

    Ok(if config.slack_summary {
        render_slack_summary(report)
    } else {
        report.render_text()
    })
}

/// Sends the report file to the destination, preceded by `message` when
/// one is configured. An `@name` destination is resolved through the cached
/// Slack users.
pub async fn send_report(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let report = load_report(config.require_report_file()?)?;
    let destination = &resolve_destination(
        session,
        require(config.send_to.as_deref(), "--send-to")?,
    )?;
    let client = SlackClient::new(config.resolve_slack(&session.settings)?)?;
    let sent_by = config.resolve_sent_by(&session.settings);
    let telemetry = StderrJsonlTelemetrySink;
    let dispatcher = Dispatcher::new(&client, &session.store, &sent_by).with_telemetry(&telemetry);

    let delivered = match config.message.as_deref() {
        Some(preceding) => {
            dispatcher
                .send_custom_message(&report, destination, preceding)
                .await?
        }
        None => dispatcher.send_report(&report, destination).await?,
    };
    write_delivery(delivered, destination)
}

/// Sends `message` on its own.
pub async fn send_message(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let destination = &resolve_destination(
        session,
        require(config.send_to.as_deref(), "--send-to")?,
    )?;
    let text = require(config.message.as_deref(), "--message")?;
    let client = SlackClient::new(config.resolve_slack(&session.settings)?)?;
    let sent_by = config.resolve_sent_by(&session.settings);
    let telemetry = StderrJsonlTelemetrySink;
    let dispatcher = Dispatcher::new(&client, &session.store, &sent_by).with_telemetry(&telemetry);

    let delivered = dispatcher.send_message(text, destination).await?;
    write_delivery(delivered, destination)
}

fn write_delivery(delivered: bool, destination: &str) -> Result<(), CliError> {
    if delivered {
        to_stdout(|stdout| write_text(stdout, &format!("Sent to {destination}")))
    } else {
        Err(CliError::Configuration {
            message: format!("Slack did not accept the message for {destination}"),
        })
    }
}

/// Prints the notification history.
pub fn history(session: &Session) -> Result<(), CliError> {
    let records = session.store.list_notifications()?;
    to_stdout(|stdout| write_history(stdout, &records))
}

/// Confirms the settings stored when the session was opened.
pub fn save_settings(session: &Session) -> Result<(), CliError> {
    tracing::info!(
        slack_workspace = session.settings.slack_workspace.as_deref().unwrap_or("-"),
        "settings saved"
    );
    to_stdout(|stdout| write_text(stdout, "Settings saved."))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use qa_generator::QaGeneratorConfig;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::render_report;
    use crate::cli::input::load_report;

    const DRAFT: &str = r#"{
        "title": "Login fix",
        "issue_link": "https://jira.x/QA-1",
        "environments": [{ "environment": "staging", "pull_request": "PR-42" }],
        "code_reviewers": ["carlos"]
    }"#;

    fn fixture_file(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("fixture should be written");
        path.to_string_lossy().into_owned()
    }

    #[rstest]
    fn plain_rendering_is_the_default() {
        let dir = TempDir::new().expect("temp dir");
        let report = load_report(&fixture_file(&dir, "report.json", DRAFT)).expect("report");

        let text = render_report(&QaGeneratorConfig::default(), &report).expect("render");

        assert_eq!(text, report.render_text());
    }

    #[rstest]
    fn slack_summary_is_selectable() {
        let dir = TempDir::new().expect("temp dir");
        let report = load_report(&fixture_file(&dir, "report.json", DRAFT)).expect("report");
        let config = QaGeneratorConfig {
            slack_summary: true,
            ..Default::default()
        };

        let text = render_report(&config, &report).expect("render");

        assert!(text.starts_with("📋 *New QA Report*"), "unexpected text: {text}");
    }

    #[rstest]
    fn template_file_wins_over_other_renderings() {
        let dir = TempDir::new().expect("temp dir");
        let report = load_report(&fixture_file(&dir, "report.json", DRAFT)).expect("report");
        let template = fixture_file(&dir, "report.j2", "{{ title }} by {{ code_reviewers | join(',') }}");
        let config = QaGeneratorConfig {
            slack_summary: true,
            template_file: Some(template),
            ..Default::default()
        };

        let text = render_report(&config, &report).expect("render");

        assert_eq!(text, "Login fix by carlos");
    }
}
