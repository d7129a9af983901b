//! Plain-text renderings of a [`QaReport`].
//!
//! [`render_text`] is the canonical format: its layout and placeholder lines
//! are compared byte-for-byte against golden outputs, so any change here is a
//! compatibility break.

use chrono::Local;

use super::model::QaReport;

const NO_ENVIRONMENTS: &str = "No records added";
const NO_COMMENTS: &str = "No comments added";
const NO_REVIEWERS: &str = "None added";

/// Renders the canonical report text.
///
/// Sections appear in a fixed order: title, issue link, environment/PR
/// pairs, review comments (blank-line separated), usability reviewers and
/// code reviewers. Empty lists render a placeholder bullet.
pub(crate) fn render_text(report: &QaReport) -> String {
    let environments = bullet_list(
        "-",
        report.environment_links().iter().map(ToString::to_string),
        NO_ENVIRONMENTS,
    );
    let comments = comment_list(report, None, NO_COMMENTS);
    let usability = bullet_list(
        "-",
        report.usability_reviewers().iter().cloned(),
        NO_REVIEWERS,
    );
    let code = bullet_list("-", report.code_reviewers().iter().cloned(), NO_REVIEWERS);

    format!(
        "*Task:* {title}\n\
         *Jira:* {issue_link}\n\
         \n\
         *Environments + PRs:*\n\
         {environments}\n\
         \n\
         *Comments:*\n\
         {comments}\n\
         \n\
         *Reviewers:*\n\
         *Usability QA:*\n\
         {usability}\n\
         *Code QA:*\n\
         {code}\n",
        title = report.title(),
        issue_link = report.issue_link(),
    )
}

/// Renders the emoji-decorated message posted as plain Slack text.
///
/// The footer carries the report's modification time in local time.
#[must_use]
pub fn render_slack_summary(report: &QaReport) -> String {
    let environments = bullet_list(
        "•",
        report.environment_links().iter().map(ToString::to_string),
        NO_ENVIRONMENTS,
    );
    let comments = comment_list(report, Some("•"), NO_COMMENTS);
    let usability = bullet_list(
        "•",
        report.usability_reviewers().iter().cloned(),
        NO_REVIEWERS,
    );
    let code = bullet_list("•", report.code_reviewers().iter().cloned(), NO_REVIEWERS);
    let generated_at = report
        .modified_at()
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M");

    format!(
        "📋 *New QA Report*\n\
         \n\
         📄 *Task:* {title}\n\
         🔗 *Jira:* {issue_link}\n\
         \n\
         🚀 *Environments + PRs:*\n\
         {environments}\n\
         \n\
         💬 *Comments:*\n\
         {comments}\n\
         \n\
         👥 *Reviewers:*\n\
         \n\
         👀 *Usability QA:*\n\
         {usability}\n\
         \n\
         💻 *Code QA:*\n\
         {code}\n\
         \n\
         ---\n\
         🕐 Generated on {generated_at}",
        title = report.title(),
        issue_link = report.issue_link(),
    )
}

fn bullet_list<I>(bullet: &str, items: I, placeholder: &str) -> String
where
    I: Iterator<Item = String>,
{
    let lines: Vec<String> = items.map(|item| format!("{bullet} {item}")).collect();
    if lines.is_empty() {
        format!("{bullet} {placeholder}")
    } else {
        lines.join("\n")
    }
}

fn comment_list(report: &QaReport, bullet: Option<&str>, placeholder: &str) -> String {
    let blocks: Vec<String> = report
        .review_comments()
        .iter()
        .map(|comment| match bullet {
            Some(symbol) => format!("{symbol} {comment}"),
            None => comment.to_string(),
        })
        .collect();
    if blocks.is_empty() {
        format!("{} {placeholder}", bullet.unwrap_or("-"))
    } else {
        blocks.join("\n\n")
    }
}
