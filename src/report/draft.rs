//! Serialisable report input used by the CLI in place of the form.

use serde::Deserialize;

use super::error::ValidationError;
use super::model::QaReport;

/// An environment/PR pair as written in a draft file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftEnvironment {
    /// Deployment environment.
    pub environment: String,
    /// Pull request reference.
    pub pull_request: String,
}

/// A review comment as written in a draft file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftComment {
    /// `usability` or `code`.
    pub kind: String,
    /// Where to test.
    pub link: String,
    /// Environment to test in.
    pub environment: String,
    /// What to do.
    pub instructions: String,
}

/// Unvalidated report fields, typically loaded from a JSON file.
///
/// ```json
/// {
///   "title": "Login fix",
///   "issue_link": "https://jira.x/QA-1",
///   "environments": [{ "environment": "staging", "pull_request": "PR-42" }],
///   "comments": [],
///   "usability_reviewers": ["ana"],
///   "code_reviewers": []
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportDraft {
    /// Report title.
    pub title: String,
    /// Issue tracker link.
    pub issue_link: String,
    /// Environment/PR pairs.
    pub environments: Vec<DraftEnvironment>,
    /// Review comments.
    pub comments: Vec<DraftComment>,
    /// Usability reviewer names.
    pub usability_reviewers: Vec<String>,
    /// Code reviewer names.
    pub code_reviewers: Vec<String>,
}

impl ReportDraft {
    /// Parses a JSON draft.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document is malformed.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Builds a report by replaying every entry through the validating
    /// `add_*` operations; the first invalid entry aborts the build.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first rejected field.
    pub fn into_report(self) -> Result<QaReport, ValidationError> {
        let mut report = QaReport::new(&self.title, &self.issue_link)?;
        for entry in &self.environments {
            report.add_environment_link(&entry.environment, &entry.pull_request)?;
        }
        for comment in &self.comments {
            report.add_review_comment_of_kind(
                &comment.kind,
                &comment.link,
                &comment.environment,
                &comment.instructions,
            )?;
        }
        for name in &self.usability_reviewers {
            report.add_usability_reviewer(name)?;
        }
        for name in &self.code_reviewers {
            report.add_code_reviewer(name)?;
        }
        Ok(report)
    }
}
