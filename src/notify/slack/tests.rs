//! Tests for the Slack Web API client.

use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::blocks::{FIELD_TEXT_LIMIT, SECTION_TEXT_LIMIT};
use super::{SlackClient, SlackClientConfig, build_report_blocks};
use crate::notify::{DispatchError, MessagingProvider};
use crate::report::{QaKind, QaReport};

fn client_for(server: &MockServer) -> SlackClient {
    let config =
        SlackClientConfig::new("xoxb-test", None).with_api_base(format!("{}/api", server.uri()));
    SlackClient::new(config).expect("client should build")
}

#[rstest]
#[case::default_host(None, "https://slack.com/api")]
#[case::blank_host(Some("  "), "https://slack.com/api")]
#[case::workspace(Some("acme.slack.com"), "https://acme.slack.com/api")]
fn config_targets_workspace_host(#[case] workspace: Option<&str>, #[case] expected: &str) {
    let config = SlackClientConfig::new("xoxb-test", workspace);

    assert_eq!(config.api_base, expected);
}

#[rstest]
fn blank_token_is_a_configuration_error() {
    let result = SlackClient::new(SlackClientConfig::new(" ", None));

    assert!(
        matches!(result, Err(DispatchError::Configuration { .. })),
        "expected Configuration error, got {result:?}"
    );
}

#[rstest]
#[tokio::test]
async fn send_message_posts_text_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-test"))
        .and(body_partial_json(json!({ "channel": "#qa", "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "ts": "1.2" })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = client_for(&server)
        .send_message("hello", "#qa")
        .await
        .expect("message should be sent");

    assert!(sent);
}

#[rstest]
#[tokio::test]
async fn provider_rejection_carries_slack_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .send_message("hello", "#missing")
        .await
        .expect_err("rejection should surface");

    assert_eq!(
        error,
        DispatchError::Provider {
            message: "channel_not_found".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn http_failure_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .send_message("hello", "#qa")
        .await
        .expect_err("HTTP failure should surface");

    assert_eq!(
        error,
        DispatchError::Http {
            status: 503,
            message: "maintenance".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn structured_message_posts_report_blocks() {
    let server = MockServer::start().await;
    let mut report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("report");
    report.add_environment_link("staging", "PR-42").expect("link");
    let blocks = build_report_blocks(&report);
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(body_partial_json(json!({ "channel": "C1", "blocks": blocks })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = client_for(&server)
        .send_structured_message(&blocks, "C1")
        .await
        .expect("blocks should be sent");

    assert!(sent);
}

#[rstest]
#[tokio::test]
async fn list_channels_requests_public_and_private() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations.list"))
        .and(query_param("types", "public_channel,private_channel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "channels": [
                { "id": "C1", "name": "qa", "is_private": false },
                { "id": "C2", "name": "release", "is_private": true }
            ]
        })))
        .mount(&server)
        .await;

    let channels = client_for(&server)
        .list_channels()
        .await
        .expect("channels should load");

    let names: Vec<(&str, bool)> = channels
        .iter()
        .map(|channel| (channel.name.as_str(), channel.is_private))
        .collect();
    assert_eq!(names, vec![("qa", false), ("release", true)]);
}

#[rstest]
#[tokio::test]
async fn list_users_skips_bots_and_deleted_members() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users.list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "members": [
                { "id": "U1", "name": "ana", "real_name": "Ana Ruiz" },
                { "id": "U2", "name": "deploybot", "is_bot": true },
                { "id": "U3", "name": "gone", "deleted": true },
                { "id": "U4", "name": "carlos" }
            ]
        })))
        .mount(&server)
        .await;

    let users = client_for(&server)
        .list_users()
        .await
        .expect("users should load");

    let ids: Vec<&str> = users.iter().map(|user| user.id.as_str()).collect();
    assert_eq!(ids, vec!["U1", "U4"]);
    assert_eq!(users.first().map(|user| user.real_name.as_str()), Some("Ana Ruiz"));
    assert_eq!(users.last().map(|user| user.real_name.as_str()), Some(""));
}

#[rstest]
#[case::accepted(json!({ "ok": true, "user": "qa-bot" }), true)]
#[case::rejected(json!({ "ok": false, "error": "invalid_auth" }), false)]
#[tokio::test]
async fn test_connection_reflects_auth_test(
    #[case] body: serde_json::Value,
    #[case] expected: bool,
) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let connected = client_for(&server)
        .test_connection()
        .await
        .expect("auth.test should complete");

    assert_eq!(connected, expected);
}

#[rstest]
fn blocks_omit_empty_sections() {
    let report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("report");

    let blocks = build_report_blocks(&report);

    let kinds: Vec<&str> = blocks
        .iter()
        .filter_map(|block| block.get("type").and_then(serde_json::Value::as_str))
        .collect();
    assert_eq!(kinds, vec!["header", "section", "divider"]);
}

#[rstest]
fn blocks_include_populated_sections() {
    let mut report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("report");
    report.add_environment_link("staging", "PR-42").expect("link");
    report
        .add_review_comment(QaKind::Code, "https://git/pr/42", "staging", "Check retry")
        .expect("comment");
    report.add_code_reviewer("carlos").expect("reviewer");

    let blocks = build_report_blocks(&report);

    assert_eq!(blocks.len(), 6);
    let environments = blocks
        .get(2)
        .and_then(|block| block.pointer("/text/text"))
        .and_then(serde_json::Value::as_str)
        .expect("environment section");
    assert_eq!(
        environments,
        "*🚀 Environments + PRs:*\n• Environment: staging - PR: PR-42"
    );
    let reviewers = blocks
        .get(4)
        .and_then(|block| block.pointer("/fields/0/text"))
        .and_then(serde_json::Value::as_str)
        .expect("reviewer fields");
    assert_eq!(reviewers, "*💻 Code QA:*\n• carlos");
}

fn text_lengths(blocks: &[serde_json::Value], pointer: &str) -> Vec<usize> {
    blocks
        .iter()
        .filter_map(|block| block.pointer(pointer))
        .filter_map(serde_json::Value::as_str)
        .map(|text| text.chars().count())
        .collect()
}

#[rstest]
fn long_comments_stay_within_slack_block_limits() {
    let mut report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("report");
    report.add_environment_link("staging", "PR-42").expect("link");
    let long_instructions = "Retry the login flow. ".repeat(160);
    report
        .add_review_comment(QaKind::Code, "https://git/pr/42", "staging", &long_instructions)
        .expect("long comment");
    for index in 0..4 {
        report
            .add_review_comment(
                QaKind::Usability,
                &format!("https://app.x/step/{index}"),
                "staging",
                &"Compare with the mockup. ".repeat(40),
            )
            .expect("comment");
    }
    report.add_code_reviewer(&"r".repeat(2500)).expect("reviewer");

    let blocks = build_report_blocks(&report);

    let sections = text_lengths(&blocks, "/text/text");
    assert!(
        sections.iter().all(|length| *length <= SECTION_TEXT_LIMIT),
        "section text lengths: {sections:?}"
    );
    let mut fields = Vec::new();
    for block in &blocks {
        if let Some(entries) = block.get("fields").and_then(serde_json::Value::as_array) {
            fields.extend(text_lengths(entries, "/text"));
        }
    }
    assert!(
        fields.iter().all(|length| *length <= FIELD_TEXT_LIMIT),
        "field text lengths: {fields:?}"
    );
}

#[rstest]
fn comments_are_split_across_sections_instead_of_dropped() {
    let mut report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("report");
    for index in 0..3 {
        report
            .add_review_comment(
                QaKind::Code,
                &format!("https://git/pr/{index}"),
                "staging",
                &"x".repeat(1200),
            )
            .expect("comment");
    }

    let blocks = build_report_blocks(&report);

    let comment_texts: Vec<&str> = blocks
        .iter()
        .filter_map(|block| block.pointer("/text/text"))
        .filter_map(serde_json::Value::as_str)
        .filter(|text| text.contains("Test at https://git/pr/"))
        .collect();
    assert_eq!(comment_texts.len(), 2);
    assert!(comment_texts.first().is_some_and(|text| text.starts_with("*💬 Comments:*")));
    assert_eq!(
        comment_texts.iter().map(|text| text.matches("Test at").count()).sum::<usize>(),
        3
    );
}
