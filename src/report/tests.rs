//! Unit tests for the QA report entity and its renderings.

use rstest::{fixture, rstest};

use super::{
    QaKind, QaReport, ReportDraft, ValidationError, render_slack_summary, render_with_template,
};

#[fixture]
fn login_report() -> QaReport {
    let mut report =
        QaReport::new("Login fix", "https://jira.x/QA-1").expect("report should build");
    report
        .add_environment_link("staging", "PR-42")
        .expect("environment link should be accepted");
    report
}

const LOGIN_REPORT_TEXT: &str = "\
*Task:* Login fix
*Jira:* https://jira.x/QA-1

*Environments + PRs:*
- Environment: staging - PR: PR-42

*Comments:*
- No comments added

*Reviewers:*
*Usability QA:*
- None added
*Code QA:*
- None added
";

#[rstest]
#[case::blank_title("", "https://jira.x/QA-1", "title")]
#[case::whitespace_title("   ", "https://jira.x/QA-1", "title")]
#[case::blank_link("Login fix", "", "issue link")]
#[case::tab_link("Login fix", "\t\n", "issue link")]
fn new_rejects_blank_required_fields(
    #[case] title: &str,
    #[case] issue_link: &str,
    #[case] field: &'static str,
) {
    let result = QaReport::new(title, issue_link);

    assert_eq!(result, Err(ValidationError::RequiredField { field }));
}

#[rstest]
fn new_trims_title_and_link() {
    let report = QaReport::new("  Login fix ", " https://jira.x/QA-1\n").expect("should build");

    assert_eq!(report.title(), "Login fix");
    assert_eq!(report.issue_link(), "https://jira.x/QA-1");
    assert_eq!(report.created_at(), report.modified_at());
}

#[rstest]
#[case::plain("staging", "PR-42")]
#[case::padded("  qa-2 ", "\t#1234  ")]
fn add_environment_link_stores_trimmed_values(#[case] environment: &str, #[case] pr: &str) {
    let mut report = QaReport::new("t", "l").expect("should build");

    report
        .add_environment_link(environment, pr)
        .expect("link should be accepted");

    let last = report.environment_links().last().expect("one link");
    assert_eq!(last.environment(), environment.trim());
    assert_eq!(last.pull_request(), pr.trim());
}

#[rstest]
#[case::blank_environment("", "PR-1")]
#[case::blank_pr("staging", "  ")]
fn add_environment_link_rejects_blank_values(
    mut login_report: QaReport,
    #[case] environment: &str,
    #[case] pr: &str,
) {
    let before = login_report.environment_links().to_vec();

    let result = login_report.add_environment_link(environment, pr);

    assert!(
        matches!(result, Err(ValidationError::RequiredField { .. })),
        "expected RequiredField, got {result:?}"
    );
    assert_eq!(login_report.environment_links(), before.as_slice());
}

#[rstest]
#[case::blank_link("", "staging", "do it", "link")]
#[case::blank_environment("https://app", " ", "do it", "environment")]
#[case::blank_instructions("https://app", "staging", "\n", "instructions")]
fn add_review_comment_rejects_blank_fields(
    mut login_report: QaReport,
    #[case] link: &str,
    #[case] environment: &str,
    #[case] instructions: &str,
    #[case] field: &'static str,
) {
    let result = login_report.add_review_comment(QaKind::Code, link, environment, instructions);

    assert_eq!(result, Err(ValidationError::RequiredField { field }));
    assert!(login_report.review_comments().is_empty());
}

#[rstest]
#[case::english("usability", QaKind::Usability)]
#[case::upper("CODE", QaKind::Code)]
#[case::legacy_usability("usabilidad", QaKind::Usability)]
#[case::legacy_code("código", QaKind::Code)]
fn qa_kind_parses_known_labels(#[case] label: &str, #[case] expected: QaKind) {
    assert_eq!(QaKind::parse(label), Ok(expected));
}

#[rstest]
fn add_review_comment_of_kind_rejects_unknown_kind(mut login_report: QaReport) {
    let result =
        login_report.add_review_comment_of_kind("security", "https://app", "staging", "check");

    assert_eq!(
        result,
        Err(ValidationError::InvalidQaKind {
            value: "security".to_owned()
        })
    );
    assert!(login_report.review_comments().is_empty());
}

#[rstest]
#[case::environment_links(0)]
#[case::review_comments(1)]
#[case::usability_reviewers(2)]
#[case::code_reviewers(3)]
fn remove_out_of_range_returns_false(mut login_report: QaReport, #[case] collection: u8) {
    login_report
        .add_review_comment(QaKind::Usability, "https://app", "staging", "click")
        .expect("comment should be accepted");
    login_report
        .add_usability_reviewer("ana")
        .expect("reviewer should be accepted");
    login_report
        .add_code_reviewer("carlos")
        .expect("reviewer should be accepted");
    let snapshot = login_report.clone();

    let removed = match collection {
        0 => login_report.remove_environment_link(1),
        1 => login_report.remove_review_comment(5),
        2 => login_report.remove_usability_reviewer(usize::MAX),
        _ => login_report.remove_code_reviewer(1),
    };

    assert!(!removed, "out-of-range removal should report false");
    assert_eq!(login_report, snapshot, "report should be unchanged");
}

#[rstest]
fn remove_in_range_removes_entry(mut login_report: QaReport) {
    login_report
        .add_environment_link("prod", "PR-43")
        .expect("link should be accepted");

    assert!(login_report.remove_environment_link(0));

    let remaining: Vec<&str> = login_report
        .environment_links()
        .iter()
        .map(|link| link.environment())
        .collect();
    assert_eq!(remaining, vec!["prod"]);
}

#[rstest]
fn duplicate_reviewer_is_ignored(mut login_report: QaReport) {
    let first = login_report.add_usability_reviewer("ana");
    let second = login_report.add_usability_reviewer(" ana ");

    assert_eq!(first, Ok(true));
    assert_eq!(second, Ok(false));
    assert_eq!(login_report.usability_reviewers(), ["ana".to_owned()]);
}

#[rstest]
fn reviewer_deduplication_is_case_sensitive(mut login_report: QaReport) {
    login_report.add_code_reviewer("Ana").expect("first");
    login_report.add_code_reviewer("ana").expect("second");

    assert_eq!(login_report.code_reviewers().len(), 2);
}

#[rstest]
fn blank_reviewer_is_rejected(mut login_report: QaReport) {
    let result = login_report.add_code_reviewer("  ");

    assert_eq!(
        result,
        Err(ValidationError::RequiredField {
            field: "reviewer name"
        })
    );
    assert!(login_report.code_reviewers().is_empty());
}

#[rstest]
fn mutations_advance_modified_at(mut login_report: QaReport) {
    let before = login_report.modified_at();

    login_report
        .add_code_reviewer("carlos")
        .expect("reviewer should be accepted");

    assert!(login_report.modified_at() >= before);
    assert!(login_report.modified_at() >= login_report.created_at());
}

#[rstest]
fn report_with_environment_is_complete(login_report: QaReport) {
    assert!(login_report.is_complete());
    assert_eq!(login_report.ensure_complete(), Ok(()));
}

#[rstest]
fn report_without_environment_is_incomplete() {
    let report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("should build");

    assert!(!report.is_complete());
    assert_eq!(
        report.ensure_complete(),
        Err(ValidationError::IncompleteReport)
    );
}

#[rstest]
fn render_text_matches_golden_output_with_placeholders(login_report: QaReport) {
    assert_eq!(login_report.render_text(), LOGIN_REPORT_TEXT);
}

#[rstest]
fn render_text_renders_every_section(mut login_report: QaReport) {
    login_report
        .add_environment_link("prod", "PR-43")
        .expect("link");
    login_report
        .add_review_comment(QaKind::Usability, "https://app/login", "staging", "Log in twice")
        .expect("comment");
    login_report
        .add_review_comment(QaKind::Code, "https://git/pr/42", "staging", "Check the retry")
        .expect("comment");
    login_report.add_usability_reviewer("ana").expect("reviewer");
    login_report.add_code_reviewer("carlos").expect("reviewer");
    login_report.add_code_reviewer("dora").expect("reviewer");

    let expected = "\
*Task:* Login fix
*Jira:* https://jira.x/QA-1

*Environments + PRs:*
- Environment: staging - PR: PR-42
- Environment: prod - PR: PR-43

*Comments:*
For usability (Environment: staging):
Test at https://app/login
Instructions:
Log in twice

For code (Environment: staging):
Test at https://git/pr/42
Instructions:
Check the retry

*Reviewers:*
*Usability QA:*
- ana
*Code QA:*
- carlos
- dora
";
    assert_eq!(login_report.render_text(), expected);
}

#[rstest]
fn render_text_of_empty_report_uses_environment_placeholder() {
    let report = QaReport::new("Login fix", "https://jira.x/QA-1").expect("should build");

    assert!(report.render_text().contains("- No records added"));
}

#[rstest]
fn render_text_is_referentially_transparent(login_report: QaReport) {
    assert_eq!(login_report.render_text(), login_report.render_text());
}

#[rstest]
fn slack_summary_uses_bullets_and_footer(login_report: QaReport) {
    let summary = render_slack_summary(&login_report);

    assert!(summary.starts_with("📋 *New QA Report*"));
    assert!(summary.contains("• Environment: staging - PR: PR-42"));
    assert!(summary.contains("• No comments added"));
    assert!(summary.contains("🕐 Generated on "));
    assert!(!summary.ends_with('\n'));
}

#[rstest]
fn summary_counts_environments(login_report: QaReport) {
    assert_eq!(
        login_report.summary(),
        "Task: Login fix | Jira: https://jira.x/QA-1 | Environments: 1"
    );
}

#[rstest]
fn template_renders_report_fields(mut login_report: QaReport) {
    login_report.add_code_reviewer("carlos").expect("reviewer");

    let output = render_with_template(
        &login_report,
        "{{ title }}|{% for e in environments %}{{ e.environment }}={{ e.pull_request }}{% endfor %}|{{ code_reviewers | join(',') }}",
    )
    .expect("template should render");

    assert_eq!(output, "Login fix|staging=PR-42|carlos");
}

#[rstest]
fn template_syntax_errors_are_reported(login_report: QaReport) {
    let error = render_with_template(&login_report, "{% for %}").expect_err("should fail");

    assert!(
        error.message.starts_with("invalid template syntax"),
        "unexpected message: {}",
        error.message
    );
}

#[rstest]
fn draft_builds_report_through_validation() {
    let draft = ReportDraft::from_json(
        r#"{
            "title": "Login fix",
            "issue_link": "https://jira.x/QA-1",
            "environments": [{"environment": "staging", "pull_request": "PR-42"}],
            "comments": [{"kind": "usability", "link": "https://app", "environment": "staging", "instructions": "click"}],
            "usability_reviewers": ["ana", "ana"]
        }"#,
    )
    .expect("draft should parse");

    let report = draft.into_report().expect("draft should validate");

    assert!(report.is_complete());
    assert_eq!(report.review_comments().len(), 1);
    assert_eq!(report.usability_reviewers(), ["ana".to_owned()]);
    assert!(report.code_reviewers().is_empty());
}

#[rstest]
fn draft_with_invalid_kind_is_rejected() {
    let draft = ReportDraft::from_json(
        r#"{
            "title": "Login fix",
            "issue_link": "https://jira.x/QA-1",
            "comments": [{"kind": "perf", "link": "l", "environment": "e", "instructions": "i"}]
        }"#,
    )
    .expect("draft should parse");

    assert!(matches!(
        draft.into_report(),
        Err(ValidationError::InvalidQaKind { .. })
    ));
}
