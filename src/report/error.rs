//! Errors raised while building or rendering a QA report.

use thiserror::Error;

/// A required value was blank or an enumerated value was not recognised.
///
/// Validation failures never leave partial data behind: the rejected
/// operation does not touch the report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming whitespace.
    #[error("{field} is required")]
    RequiredField {
        /// Human-readable field name.
        field: &'static str,
    },

    /// The review kind was neither usability nor code.
    #[error("invalid QA kind: {value}")]
    InvalidQaKind {
        /// The rejected input.
        value: String,
    },

    /// The report lacks a title, an issue link, or an environment link.
    #[error("report must have a title, an issue link and at least one environment link")]
    IncompleteReport,

    /// A branch name broke one of the git reference naming rules.
    #[error("invalid branch name: {reason}")]
    InvalidBranchName {
        /// Which rule was broken.
        reason: String,
    },
}

/// A user-supplied report template failed to compile or render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("report template error: {message}")]
pub struct TemplateError {
    /// Detail from the template engine.
    pub message: String,
}

/// Returns the trimmed value, or [`ValidationError::RequiredField`] when it
/// is blank.
pub(crate) fn require_non_blank(
    value: &str,
    field: &'static str,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField { field });
    }
    Ok(trimmed.to_owned())
}
