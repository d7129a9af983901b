//! The QA report entity and its text renderings.
//!
//! A [`QaReport`] holds validated hand-off data: a title, an issue link,
//! environment/PR pairs, review comments and two reviewer lists. Every
//! mutation validates its input first, so a rejected call never leaves a
//! partially written entry behind. Rendering is a pure function of the
//! report's state.

mod draft;
mod error;
mod model;
mod render;
mod template;

pub use draft::{DraftComment, DraftEnvironment, ReportDraft};
pub use error::{TemplateError, ValidationError};
pub use model::{EnvironmentLink, QaKind, QaReport, ReviewComment, ReviewerSet};
pub use render::render_slack_summary;
pub use template::render_with_template;

#[cfg(test)]
mod tests;
