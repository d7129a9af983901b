//! Shared helpers for tests that drive the `qa-generator` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Environment variables that would leak developer configuration into a run.
const HERMETIC_VARIABLES: &[&str] = &[
    "QA_GENERATOR_DATABASE_URL",
    "QA_GENERATOR_MIGRATE_DB",
    "QA_GENERATOR_REPORT_FILE",
    "QA_GENERATOR_SEND_TO",
    "QA_GENERATOR_MESSAGE",
    "QA_GENERATOR_SLACK_TOKEN",
    "QA_GENERATOR_SLACK_WORKSPACE",
    "QA_GENERATOR_GITHUB_TOKEN",
    "QA_GENERATOR_REPO",
    "QA_GENERATOR_JIRA_SERVER",
    "QA_GENERATOR_JIRA_USERNAME",
    "QA_GENERATOR_JIRA_TOKEN",
    "QA_GENERATOR_GIT_PATH",
    "QA_GENERATOR_LOG",
    "QA_GENERATOR_LOG_FORMAT",
    "GITHUB_TOKEN",
];

/// Creates a temporary directory for database and report fixtures.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// Writes `content` to `name` inside `dir` and returns the path as a string.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .unwrap_or_else(|error| panic!("failed to write {}: {error}", path.display()));
    path.to_string_lossy().into_owned()
}

/// Returns the path to the built binary.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_qa-generator"))
}

/// Runs the binary with `args` and `env` overrides in `working_dir`.
///
/// `None` values remove the variable.
///
/// # Panics
///
/// Panics if the binary cannot be spawned.
pub fn run_qa_generator(
    args: &[&str],
    env: &[(&str, Option<&str>)],
    working_dir: &Path,
) -> Output {
    let mut command = Command::new(binary_path());
    command.args(args).current_dir(working_dir);

    for variable in HERMETIC_VARIABLES {
        command.env_remove(variable);
    }

    for (key, value) in env {
        match value {
            Some(env_value) => {
                command.env(key, env_value);
            }
            None => {
                command.env_remove(key);
            }
        }
    }

    command
        .output()
        .unwrap_or_else(|error| panic!("failed to execute binary: {error}"))
}
