//! The QA report aggregate and its validated parts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{ValidationError, require_non_blank};
use super::render;

/// The kind of review a comment asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QaKind {
    /// Exploratory/usability testing.
    Usability,
    /// Code review.
    Code,
}

impl QaKind {
    /// Returns the lowercase label used in rendered text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usability => "usability",
            Self::Code => "code",
        }
    }

    /// Parses a kind label, ignoring case and surrounding whitespace.
    ///
    /// The Spanish labels `usabilidad`, `código` and `codigo` written by
    /// earlier releases are accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQaKind`] for any other value.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_lowercase().as_str() {
            "usability" | "usabilidad" => Ok(Self::Usability),
            "code" | "código" | "codigo" => Ok(Self::Code),
            _ => Err(ValidationError::InvalidQaKind {
                value: value.to_owned(),
            }),
        }
    }
}

impl FromStr for QaKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for QaKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// An environment the change was tested in and the pull request behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentLink {
    environment: String,
    pull_request: String,
}

impl EnvironmentLink {
    /// Validates and trims both parts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when either part is blank.
    pub fn new(environment: &str, pull_request: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            environment: require_non_blank(environment, "environment")?,
            pull_request: require_non_blank(pull_request, "pull request")?,
        })
    }

    /// The deployment environment.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The pull/merge request reference.
    #[must_use]
    pub fn pull_request(&self) -> &str {
        &self.pull_request
    }
}

impl fmt::Display for EnvironmentLink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Environment: {} - PR: {}",
            self.environment, self.pull_request
        )
    }
}

/// A single QA instruction scoped to a review kind, link and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    kind: QaKind,
    target_link: String,
    environment: String,
    instructions: String,
    created_at: DateTime<Utc>,
}

impl ReviewComment {
    /// Validates and trims the text fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when the link, environment
    /// or instructions are blank.
    pub fn new(
        kind: QaKind,
        target_link: &str,
        environment: &str,
        instructions: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            kind,
            target_link: require_non_blank(target_link, "link")?,
            environment: require_non_blank(environment, "environment")?,
            instructions: require_non_blank(instructions, "instructions")?,
            created_at: Utc::now(),
        })
    }

    /// The review kind.
    #[must_use]
    pub const fn kind(&self) -> QaKind {
        self.kind
    }

    /// Where the reviewer should test.
    #[must_use]
    pub fn target_link(&self) -> &str {
        &self.target_link
    }

    /// The environment to test in.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// What the reviewer should do.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// When the comment was added.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for ReviewComment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "For {} (Environment: {}):\nTest at {}\nInstructions:\n{}",
            self.kind, self.environment, self.target_link, self.instructions
        )
    }
}

/// Reviewer names in insertion order with exact-match deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewerSet(Vec<String>);

impl ReviewerSet {
    /// Adds a trimmed name; returns `Ok(false)` when it is already present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when the name is blank.
    pub fn insert(&mut self, name: &str) -> Result<bool, ValidationError> {
        let reviewer = require_non_blank(name, "reviewer name")?;
        if self.0.contains(&reviewer) {
            return Ok(false);
        }
        self.0.push(reviewer);
        Ok(true)
    }

    /// Removes the name at `index`; out-of-range indices return `false`.
    pub fn remove(&mut self, index: usize) -> bool {
        remove_checked(&mut self.0, index)
    }

    /// Names in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of reviewers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no reviewer has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A QA hand-off report.
///
/// Sub-collections are only mutated through the `add_*`/`remove_*` methods,
/// each of which validates its input and bumps [`QaReport::modified_at`] when
/// it changes something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaReport {
    title: String,
    issue_link: String,
    environment_links: Vec<EnvironmentLink>,
    review_comments: Vec<ReviewComment>,
    usability_reviewers: ReviewerSet,
    code_reviewers: ReviewerSet,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl QaReport {
    /// Creates an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when the title or issue
    /// link is blank.
    pub fn new(title: &str, issue_link: &str) -> Result<Self, ValidationError> {
        let now = Utc::now();
        Ok(Self {
            title: require_non_blank(title, "title")?,
            issue_link: require_non_blank(issue_link, "issue link")?,
            environment_links: Vec::new(),
            review_comments: Vec::new(),
            usability_reviewers: ReviewerSet::default(),
            code_reviewers: ReviewerSet::default(),
            created_at: now,
            modified_at: now,
        })
    }

    /// The report title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The issue tracker link.
    #[must_use]
    pub fn issue_link(&self) -> &str {
        &self.issue_link
    }

    /// Environment/PR pairs in insertion order.
    #[must_use]
    pub fn environment_links(&self) -> &[EnvironmentLink] {
        &self.environment_links
    }

    /// Review comments in insertion order.
    #[must_use]
    pub fn review_comments(&self) -> &[ReviewComment] {
        &self.review_comments
    }

    /// Usability reviewers in insertion order.
    #[must_use]
    pub fn usability_reviewers(&self) -> &[String] {
        self.usability_reviewers.as_slice()
    }

    /// Code reviewers in insertion order.
    #[must_use]
    pub fn code_reviewers(&self) -> &[String] {
        self.code_reviewers.as_slice()
    }

    /// When the report was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the report last changed.
    #[must_use]
    pub const fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when `title` is blank.
    pub fn set_title(&mut self, title: &str) -> Result<(), ValidationError> {
        self.title = require_non_blank(title, "title")?;
        self.touch();
        Ok(())
    }

    /// Replaces the issue link.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when `issue_link` is blank.
    pub fn set_issue_link(&mut self, issue_link: &str) -> Result<(), ValidationError> {
        self.issue_link = require_non_blank(issue_link, "issue link")?;
        self.touch();
        Ok(())
    }

    /// Appends an environment/PR pair.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when either part is blank.
    pub fn add_environment_link(
        &mut self,
        environment: &str,
        pull_request: &str,
    ) -> Result<(), ValidationError> {
        self.environment_links
            .push(EnvironmentLink::new(environment, pull_request)?);
        self.touch();
        Ok(())
    }

    /// Removes the environment link at `index`.
    pub fn remove_environment_link(&mut self, index: usize) -> bool {
        let removed = remove_checked(&mut self.environment_links, index);
        self.touch_if(removed)
    }

    /// Appends a review comment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when the link, environment
    /// or instructions are blank.
    pub fn add_review_comment(
        &mut self,
        kind: QaKind,
        target_link: &str,
        environment: &str,
        instructions: &str,
    ) -> Result<(), ValidationError> {
        self.review_comments.push(ReviewComment::new(
            kind,
            target_link,
            environment,
            instructions,
        )?);
        self.touch();
        Ok(())
    }

    /// Appends a review comment whose kind is given as text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQaKind`] for an unknown kind, or
    /// [`ValidationError::RequiredField`] for a blank field.
    pub fn add_review_comment_of_kind(
        &mut self,
        kind: &str,
        target_link: &str,
        environment: &str,
        instructions: &str,
    ) -> Result<(), ValidationError> {
        let parsed_kind = QaKind::parse(kind)?;
        self.add_review_comment(parsed_kind, target_link, environment, instructions)
    }

    /// Removes the review comment at `index`.
    pub fn remove_review_comment(&mut self, index: usize) -> bool {
        let removed = remove_checked(&mut self.review_comments, index);
        self.touch_if(removed)
    }

    /// Adds a usability reviewer; an existing name is left as is and yields
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when `name` is blank.
    pub fn add_usability_reviewer(&mut self, name: &str) -> Result<bool, ValidationError> {
        let added = self.usability_reviewers.insert(name)?;
        Ok(self.touch_if(added))
    }

    /// Removes the usability reviewer at `index`.
    pub fn remove_usability_reviewer(&mut self, index: usize) -> bool {
        let removed = self.usability_reviewers.remove(index);
        self.touch_if(removed)
    }

    /// Adds a code reviewer; an existing name is left as is and yields
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredField`] when `name` is blank.
    pub fn add_code_reviewer(&mut self, name: &str) -> Result<bool, ValidationError> {
        let added = self.code_reviewers.insert(name)?;
        Ok(self.touch_if(added))
    }

    /// Removes the code reviewer at `index`.
    pub fn remove_code_reviewer(&mut self, index: usize) -> bool {
        let removed = self.code_reviewers.remove(index);
        self.touch_if(removed)
    }

    /// True when the title and issue link are set and at least one
    /// environment link exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.issue_link.trim().is_empty()
            && !self.environment_links.is_empty()
    }

    /// Fails with [`ValidationError::IncompleteReport`] unless
    /// [`QaReport::is_complete`] holds.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn ensure_complete(&self) -> Result<(), ValidationError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(ValidationError::IncompleteReport)
        }
    }

    /// One-line summary for status displays.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Task: {} | Jira: {} | Environments: {}",
            self.title,
            self.issue_link,
            self.environment_links.len()
        )
    }

    /// Renders the canonical plain-text report.
    #[must_use]
    pub fn render_text(&self) -> String {
        render::render_text(self)
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    fn touch_if(&mut self, changed: bool) -> bool {
        if changed {
            self.touch();
        }
        changed
    }
}

fn remove_checked<T>(items: &mut Vec<T>, index: usize) -> bool {
    if index < items.len() {
        items.remove(index);
        true
    } else {
        false
    }
}
