//! Reading report drafts and templates from disk.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use qa_generator::report::{QaReport, ReportDraft};

use super::error::CliError;

/// Reads a UTF-8 file relative to the working directory or from an
/// absolute path.
pub fn read_text_file(path: &str, purpose: &str) -> Result<String, CliError> {
    let file_path = Utf8Path::new(path);
    let file_name = file_path.file_name().ok_or_else(|| CliError::Io {
        message: format!("invalid {purpose} path '{path}': no file name"),
    })?;
    let parent = file_path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| CliError::Io {
        message: format!("failed to open {purpose} directory '{parent}': {error}"),
    })?;
    dir.read_to_string(file_name).map_err(|error| CliError::Io {
        message: format!("failed to read {purpose} '{path}': {error}"),
    })
}

/// Loads and validates the report draft at `path`.
pub fn load_report(path: &str) -> Result<QaReport, CliError> {
    let source = read_text_file(path, "report file")?;
    let draft = ReportDraft::from_json(&source).map_err(|error| CliError::Configuration {
        message: format!("report file '{path}' is not a valid draft: {error}"),
    })?;
    Ok(draft.into_report()?)
}
