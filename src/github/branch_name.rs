//! Branch name rules.
//!
//! [`validate_branch_name`] enforces the subset of git reference naming rules
//! GitHub rejects most often; [`sanitize_branch_name`] turns free text into a
//! candidate that passes them.

use crate::report::ValidationError;

/// Longest accepted branch name, in characters.
pub const MAX_BRANCH_NAME_CHARS: usize = 250;

const FORBIDDEN_CHARACTERS: &[char] = &['~', '^', ':', '?', '*', '[', ']', '\\'];
const RESERVED_NAMES: &[&str] = &["HEAD", "refs", "origin"];
const FALLBACK_NAME: &str = "feature";

/// Checks `name` (after trimming) against the branch naming rules.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidBranchName`] naming the first rule the
/// name breaks.
pub fn validate_branch_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let reason = if trimmed.is_empty() {
        Some("branch name cannot be empty".to_owned())
    } else if trimmed.chars().count() > MAX_BRANCH_NAME_CHARS {
        Some(format!(
            "branch name cannot be longer than {MAX_BRANCH_NAME_CHARS} characters"
        ))
    } else if trimmed.contains(FORBIDDEN_CHARACTERS) {
        Some("branch name contains a forbidden character: ~ ^ : ? * [ ] \\".to_owned())
    } else if trimmed.starts_with('.') || trimmed.ends_with('.') {
        Some("branch name cannot start or end with a dot".to_owned())
    } else if trimmed.starts_with('/') || trimmed.ends_with('/') {
        Some("branch name cannot start or end with a slash".to_owned())
    } else if trimmed.starts_with('-') || trimmed.ends_with('-') {
        Some("branch name cannot start or end with a hyphen".to_owned())
    } else if trimmed.contains("  ") || trimmed.chars().any(|character| u32::from(character) < 32)
    {
        Some("branch name cannot contain consecutive spaces or control characters".to_owned())
    } else if trimmed.chars().all(|character| character == '.') {
        Some("branch name cannot consist only of dots".to_owned())
    } else if RESERVED_NAMES.contains(&trimmed) {
        Some(format!("`{trimmed}` is a reserved name"))
    } else {
        None
    };

    reason.map_or(Ok(()), |message| {
        Err(ValidationError::InvalidBranchName { reason: message })
    })
}

/// Converts free text into a branch name candidate.
///
/// Characters other than ASCII letters, digits, `-`, `_` and `/` become `-`;
/// runs of `-` collapse to one and leading/trailing `-` are dropped. An empty
/// result falls back to `feature`.
#[must_use]
pub fn sanitize_branch_name(base: &str) -> String {
    let mut sanitized = String::with_capacity(base.len());
    for character in base.chars() {
        let replacement = if character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '/')
        {
            character
        } else {
            '-'
        };
        if replacement == '-' && sanitized.ends_with('-') {
            continue;
        }
        sanitized.push(replacement);
    }

    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}
