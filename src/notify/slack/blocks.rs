//! Slack Block Kit layout for a QA report.

use serde_json::{Value, json};

use crate::http_body::truncate_for_message;
use crate::report::QaReport;

/// Slack rejects section texts longer than this with `invalid_blocks`.
pub const SECTION_TEXT_LIMIT: usize = 3000;

/// Slack rejects section field texts longer than this.
pub const FIELD_TEXT_LIMIT: usize = 2000;

/// Room left for the `...` marker appended by truncation.
const ELLIPSIS_CHARS: usize = 3;

/// Builds the Block Kit blocks posted for `report`.
///
/// The header and the task/issue fields are always present. Environment,
/// comment and reviewer sections are omitted when empty. A divider closes
/// the message.
///
/// Comments are packed into as many sections as needed to keep each under
/// [`SECTION_TEXT_LIMIT`]; a single comment that is still too long, and any
/// field over [`FIELD_TEXT_LIMIT`], is truncated.
#[must_use]
pub fn build_report_blocks(report: &QaReport) -> Vec<Value> {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": "📋 New QA Report", "emoji": true }
        }),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(&format!("*Task:*\n{}", report.title())),
                mrkdwn(&format!("*Jira:*\n{}", report.issue_link())),
            ]
        }),
    ];

    if !report.environment_links().is_empty() {
        let lines = bullets(report.environment_links().iter().map(ToString::to_string), "\n");
        blocks.push(section(&format!("*🚀 Environments + PRs:*\n{lines}")));
    }

    if !report.review_comments().is_empty() {
        let comments = report
            .review_comments()
            .iter()
            .map(|comment| format!("• {comment}"));
        blocks.extend(
            pack_sections("*💬 Comments:*", comments, "\n\n")
                .iter()
                .map(|text| section(text)),
        );
    }

    let mut reviewer_fields = Vec::new();
    if !report.usability_reviewers().is_empty() {
        let lines = bullets(report.usability_reviewers().iter().cloned(), "\n");
        reviewer_fields.push(mrkdwn(&format!("*👀 Usability QA:*\n{lines}")));
    }
    if !report.code_reviewers().is_empty() {
        let lines = bullets(report.code_reviewers().iter().cloned(), "\n");
        reviewer_fields.push(mrkdwn(&format!("*💻 Code QA:*\n{lines}")));
    }
    if !reviewer_fields.is_empty() {
        blocks.push(json!({ "type": "section", "fields": reviewer_fields }));
    }

    blocks.push(json!({ "type": "divider" }));
    blocks
}

fn mrkdwn(text: &str) -> Value {
    json!({
        "type": "mrkdwn",
        "text": truncate_for_message(text, FIELD_TEXT_LIMIT - ELLIPSIS_CHARS)
    })
}

fn section(text: &str) -> Value {
    json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": truncate_for_message(text, SECTION_TEXT_LIMIT - ELLIPSIS_CHARS)
        }
    })
}

/// Joins `items` under `title`, starting a new text whenever the next item
/// would push the current one past [`SECTION_TEXT_LIMIT`].
fn pack_sections<I>(title: &str, items: I, separator: &str) -> Vec<String>
where
    I: Iterator<Item = String>,
{
    let mut sections = Vec::new();
    let mut current = format!("{title}\n");
    let mut current_chars = current.chars().count();
    let mut has_items = false;

    for item in items {
        let item_chars = item.chars().count();
        let separator_chars = if has_items { separator.chars().count() } else { 0 };
        if has_items && current_chars + separator_chars + item_chars > SECTION_TEXT_LIMIT {
            sections.push(std::mem::take(&mut current));
            current_chars = 0;
            has_items = false;
        }
        if has_items {
            current.push_str(separator);
            current_chars += separator_chars;
        }
        current.push_str(&item);
        current_chars += item_chars;
        has_items = true;
    }

    sections.push(current);
    sections
}

fn bullets<I>(items: I, separator: &str) -> String
where
    I: Iterator<Item = String>,
{
    items
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join(separator)
}
