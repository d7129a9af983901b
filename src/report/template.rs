//! Template-driven report rendering using Jinja2-compatible syntax.
//!
//! Teams that want a different layout than the canonical text can supply a
//! `minijinja` template. Auto-escaping is off since the output is chat text.
//!
//! # Available Variables
//!
//! - `title`, `issue_link`, `summary`
//! - `generated_at`: RFC 3339 timestamp of the report's last change
//! - `environments`: list of `{ environment, pull_request }`
//! - `comments`: list of `{ kind, link, environment, instructions }`
//! - `usability_reviewers`, `code_reviewers`: lists of names

use minijinja::{Environment, context};
use serde::Serialize;

use super::error::TemplateError;
use super::model::{EnvironmentLink, QaReport, ReviewComment};

#[derive(Debug, Serialize)]
struct TemplateEnvironment<'a> {
    environment: &'a str,
    pull_request: &'a str,
}

impl<'a> From<&'a EnvironmentLink> for TemplateEnvironment<'a> {
    fn from(link: &'a EnvironmentLink) -> Self {
        Self {
            environment: link.environment(),
            pull_request: link.pull_request(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TemplateComment<'a> {
    kind: &'static str,
    link: &'a str,
    environment: &'a str,
    instructions: &'a str,
}

impl<'a> From<&'a ReviewComment> for TemplateComment<'a> {
    fn from(comment: &'a ReviewComment) -> Self {
        Self {
            kind: comment.kind().as_str(),
            link: comment.target_link(),
            environment: comment.environment(),
            instructions: comment.instructions(),
        }
    }
}

/// Renders `report` through a user-supplied template.
///
/// # Errors
///
/// Returns [`TemplateError`] when the template has syntax errors or fails
/// while rendering.
///
/// # Example Template
///
/// ```jinja2
/// {{ title }} ({{ issue_link }})
/// {% for env in environments %}
/// * {{ env.environment }} -> {{ env.pull_request }}
/// {% endfor %}
/// ```
pub fn render_with_template(
    report: &QaReport,
    template_source: &str,
) -> Result<String, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

    env.add_template("report", template_source)
        .map_err(|error| TemplateError {
            message: format!("invalid template syntax: {error}"),
        })?;

    let environments: Vec<TemplateEnvironment<'_>> = report
        .environment_links()
        .iter()
        .map(TemplateEnvironment::from)
        .collect();
    let comments: Vec<TemplateComment<'_>> = report
        .review_comments()
        .iter()
        .map(TemplateComment::from)
        .collect();

    let ctx = context! {
        title => report.title(),
        issue_link => report.issue_link(),
        summary => report.summary(),
        generated_at => report.modified_at().to_rfc3339(),
        environments => environments,
        comments => comments,
        usability_reviewers => report.usability_reviewers(),
        code_reviewers => report.code_reviewers(),
    };

    let template = env.get_template("report").map_err(|error| TemplateError {
        message: format!("failed to retrieve template: {error}"),
    })?;

    template.render(ctx).map_err(|error| TemplateError {
        message: format!("template rendering failed: {error}"),
    })
}
