//! Tests for the Jira REST client.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{JiraClient, JiraConfig};
use crate::jira::{ASSIGNED_ISSUES_JQL, IssueTracker, JiraError, project_issues_jql};

fn client_for(server: &MockServer) -> FixtureResult<JiraClient> {
    let config = JiraConfig::new(&format!("{}/", server.uri()), "ana@example.com", "jira-token");
    Ok(JiraClient::new(config)?)
}

async fn mount_myself(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .and(basic_auth("ana@example.com", "jira-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "displayName": "Ana QA",
            "emailAddress": "ana@example.com",
            "accountId": "abc-123",
            "active": true,
            "timeZone": "Europe/Madrid"
        })))
        .mount(server)
        .await;
}

async fn connected_client(server: &MockServer) -> FixtureResult<JiraClient> {
    mount_myself(server).await;
    let client = client_for(server)?;
    client.connect().await?;
    Ok(client)
}

#[rstest]
#[case::trailing_slash("https://jira.example.com/", "https://jira.example.com")]
#[case::padded("  https://jira.example.com  ", "https://jira.example.com")]
#[case::plain("https://jira.example.com", "https://jira.example.com")]
fn config_trims_server_url(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(JiraConfig::new(input, "ana", "token").server, expected);
}

#[rstest]
#[case::server("", "ana", "token", "server URL")]
#[case::username("https://jira.example.com", " ", "token", "username")]
#[case::token("https://jira.example.com", "ana", "", "API token")]
fn blank_settings_are_configuration_errors(
    #[case] server: &str,
    #[case] username: &str,
    #[case] token: &str,
    #[case] field: &str,
) {
    let result = JiraClient::new(JiraConfig::new(server, username, token));

    let Err(JiraError::Configuration { message }) = result else {
        panic!("expected Configuration error, got {result:?}");
    };
    assert!(message.contains(field), "`{message}` should mention {field}");
}

#[rstest]
#[tokio::test]
async fn connect_verifies_credentials_through_myself() {
    let server = MockServer::start().await;
    mount_myself(&server).await;
    let client = client_for(&server).expect("client should build");

    let user = client.connect().await.expect("connection should succeed");

    assert_eq!(user.display_name, "Ana QA");
    assert_eq!(user.account_id.as_deref(), Some("abc-123"));
    assert_eq!(client.connected_user(), Some(&user));
}

#[rstest]
#[tokio::test]
async fn rejected_credentials_map_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorMessages": ["Client must be authenticated to access this resource."]
        })))
        .mount(&server)
        .await;
    let client = client_for(&server).expect("client should build");

    let error = client.connect().await.expect_err("connection should fail");

    assert_eq!(
        error,
        JiraError::Authentication {
            message: "Client must be authenticated to access this resource.".to_owned()
        }
    );
    assert_eq!(client.connected_user(), None);
}

#[rstest]
#[tokio::test]
async fn queries_require_a_connection() {
    let server = MockServer::start().await;
    let client = client_for(&server).expect("client should build");

    let result = client.assigned_issues(50).await;

    assert_eq!(result, Err(JiraError::NotConnected));
}

#[rstest]
#[tokio::test]
async fn assigned_issues_use_open_issue_query_and_fill_placeholders() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("jql", ASSIGNED_ISSUES_JQL))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{
                "key": "QA-1",
                "fields": {
                    "summary": "Login fix",
                    "description": null,
                    "status": { "name": "In Progress" },
                    "priority": null,
                    "issuetype": { "name": "Bug" },
                    "project": { "key": "QA", "name": "Quality" },
                    "assignee": null,
                    "reporter": { "displayName": "Carlos" },
                    "created": "2025-03-01T10:00:00.000+0100",
                    "updated": "2025-03-02T11:30:00.000+0100"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issues = client
        .assigned_issues(50)
        .await
        .expect("issues should load");

    let issue = issues.first().expect("one issue");
    assert_eq!(issue.key, "QA-1");
    assert_eq!(issue.description, "");
    assert_eq!(issue.priority, "No Priority");
    assert_eq!(issue.assignee, "Unassigned");
    assert_eq!(issue.reporter, "Carlos");
    assert_eq!(issue.project_name, "Quality");
    assert_eq!(issue.created.as_deref(), Some("2025-03-01"));
    assert_eq!(issue.updated.as_deref(), Some("2025-03-02"));
    assert_eq!(issue.url, format!("{}/browse/QA-1", server.uri()));
}

#[rstest]
#[tokio::test]
async fn project_issues_quote_the_project_key() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("jql", "project = \"QA\" ORDER BY updated DESC"))
        .and(query_param("maxResults", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "issues": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let issues = client
        .project_issues("QA", 30)
        .await
        .expect("issues should load");

    assert!(issues.is_empty());
}

#[rstest]
#[tokio::test]
async fn invalid_jql_reports_jira_messages() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["Field 'nope' does not exist.", "Query is invalid."]
        })))
        .mount(&server)
        .await;

    let error = client
        .search_issues("nope = 1", 50)
        .await
        .expect_err("search should fail");

    assert_eq!(
        error,
        JiraError::Api {
            status: 400,
            message: "Field 'nope' does not exist.; Query is invalid.".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn projects_carry_browse_urls() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "QA", "name": "Quality", "lead": { "displayName": "Ana" }, "projectTypeKey": "software" },
            { "key": "OPS", "name": "Operations" }
        ])))
        .mount(&server)
        .await;

    let projects = client.projects().await.expect("projects should load");

    assert_eq!(projects.len(), 2);
    let ops = projects.get(1).expect("second project");
    assert_eq!(ops.lead, "Unknown");
    assert_eq!(ops.project_type, "Unknown");
    assert_eq!(ops.url, format!("{}/browse/OPS", server.uri()));
}

#[rstest]
#[tokio::test]
async fn transitions_list_target_status() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/QA-1/transitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transitions": [{ "id": "31", "name": "Ready for QA", "to": { "name": "QA" } }]
        })))
        .mount(&server)
        .await;

    let transitions = client
        .transitions("QA-1")
        .await
        .expect("transitions should load");

    let transition = transitions.first().expect("one transition");
    assert_eq!(transition.id, "31");
    assert_eq!(transition.to_status.as_deref(), Some("QA"));
}

#[rstest]
#[tokio::test]
async fn issue_keys_are_encoded_as_one_path_segment() {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/QA-1%3Fexpand=all%23x%2Fmyself/transitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transitions": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let transitions = client
        .transitions("QA-1?expand=all#x/myself")
        .await
        .expect("transitions should load");

    assert!(transitions.is_empty());
}

#[rstest]
#[case::plain("QA", r#"project = "QA" ORDER BY updated DESC"#)]
#[case::embedded_quote(r#"Q" OR project = "X"#, r#"project = "Q\" OR project = \"X" ORDER BY updated DESC"#)]
#[case::backslash(r"Q\", r#"project = "Q\\" ORDER BY updated DESC"#)]
fn project_keys_cannot_break_out_of_the_jql_string(#[case] key: &str, #[case] expected: &str) {
    assert_eq!(project_issues_jql(key), expected);
}

#[rstest]
#[case::with_comment(
    Some("Verified on staging"),
    json!({
        "transition": { "id": "31" },
        "update": { "comment": [{ "add": { "body": "Verified on staging" } }] }
    })
)]
#[case::blank_comment(Some("  "), json!({ "transition": { "id": "31" } }))]
#[case::without_comment(None, json!({ "transition": { "id": "31" } }))]
#[tokio::test]
async fn apply_transition_posts_optional_comment(
    #[case] comment: Option<&str>,
    #[case] expected_body: serde_json::Value,
) {
    let server = MockServer::start().await;
    let client = connected_client(&server)
        .await
        .expect("client should connect");
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/QA-1/transitions"))
        .and(body_json(expected_body))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .apply_transition("QA-1", "31", comment)
        .await
        .expect("transition should apply");
}
