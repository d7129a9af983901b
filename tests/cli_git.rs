//! CLI integration tests for the local working-copy operations.

mod support;

use std::process::Output;

use git2::Repository;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use support::{create_temp_dir, run_qa_generator, write_fixture};

/// A fresh repository whose `HEAD` points at an unborn `main`.
#[fixture]
fn repository() -> TempDir {
    let dir = create_temp_dir();
    let repo = Repository::init(dir.path())
        .unwrap_or_else(|error| panic!("failed to initialise repository: {error}"));
    repo.set_head("refs/heads/main")
        .unwrap_or_else(|error| panic!("failed to point HEAD at main: {error}"));
    let mut config = repo
        .config()
        .unwrap_or_else(|error| panic!("failed to open repository config: {error}"));
    for (key, value) in [("user.name", "Test User"), ("user.email", "test@example.com")] {
        config
            .set_str(key, value)
            .unwrap_or_else(|error| panic!("failed to set {key}: {error}"));
    }
    dir
}

fn run_in(dir: &TempDir, args: &[&str]) -> Output {
    let path = dir.path().to_string_lossy().into_owned();
    let mut full_args = vec!["--git-path", path.as_str()];
    full_args.extend_from_slice(args);
    run_qa_generator(&full_args, &[], dir.path())
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[rstest]
fn status_lists_untracked_files(repository: TempDir) {
    write_fixture(repository.path(), "notes.txt", "check login\n");

    let output = run_in(&repository, &["--git-status"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "❓ ?? notes.txt (Untracked)\n");
}

#[rstest]
fn status_of_a_clean_repository(repository: TempDir) {
    let output = run_in(&repository, &["--git-status"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "Working tree clean.\n");
}

#[rstest]
fn stage_and_commit_in_one_run(repository: TempDir) {
    write_fixture(repository.path(), "notes.txt", "check login\n");

    let commit = run_in(
        &repository,
        &["--git-stage", "notes.txt", "--git-commit", "Add QA notes"],
    );
    let branch = run_in(&repository, &["--git-branch"]);
    let status = run_in(&repository, &["--git-status"]);

    assert!(commit.status.success(), "stderr: {}", stderr_of(&commit));
    assert!(
        stdout_of(&commit).starts_with("Committed ")
            && stdout_of(&commit).ends_with(" on main: Add QA notes\n"),
        "unexpected stdout: {}",
        stdout_of(&commit)
    );
    assert_eq!(stdout_of(&branch), "main\n");
    assert_eq!(stdout_of(&status), "Working tree clean.\n");
}

#[rstest]
fn diff_of_an_untracked_file(repository: TempDir) {
    write_fixture(repository.path(), "notes.txt", "check login\n");

    let output = run_in(&repository, &["--git-diff", "notes.txt"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "New file: notes.txt\n\n+check login\n");
}

#[rstest]
fn commit_without_changes_fails(repository: TempDir) {
    let output = run_in(&repository, &["--git-commit", "Empty"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr_of(&output).contains("nothing to commit"),
        "unexpected stderr: {}",
        stderr_of(&output)
    );
}

#[rstest]
fn operations_outside_a_repository_fail() {
    let dir = create_temp_dir();
    let output = run_in(&dir, &["--git-status"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr_of(&output).contains("not inside a Git repository"),
        "unexpected stderr: {}",
        stderr_of(&output)
    );
}
