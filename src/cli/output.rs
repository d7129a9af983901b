//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use qa_generator::github::{Branch, Repository, RepositoryDetails, RepositoryIssue};
use qa_generator::jira::{Issue, JiraUser, Project, Transition};
use qa_generator::local::ChangedFile;
use qa_generator::notify::Channel;
use qa_generator::persistence::{NotificationRecord, SlackUser};

use super::error::{CliError, io_error};

const USAGE: &str = "\
Nothing to do. Choose an operation, for example:
  --report-file report.json                  render a report
  --report-file report.json --send-to C123   send it to Slack
  --send-to C123 --message \"hello\"           send a plain message
  --history                                  show the notification history
  --list-channels | --list-users             browse the Slack workspace
  --repo owner/name --list-branches          list branches
  --repo owner/name --repo-details           summarise a repository
  --repo owner/name --repo-issues            list its open issues
  --jira-assigned | --jql \"...\"              query Jira
  --git-status | --git-diff FILE             inspect the local working copy
  --git-stage FILE --git-commit \"msg\"        stage and commit
  --test-slack | --cached-users              check Slack, show cached users
  --migrate-db                               prepare the local database";

/// Runs `write` against a locked stdout.
pub fn to_stdout<F>(write: F) -> Result<(), CliError>
where
    F: FnOnce(&mut io::StdoutLock<'_>) -> Result<(), CliError>,
{
    let mut stdout = io::stdout().lock();
    write(&mut stdout)
}

/// Writes `text` followed by a newline.
pub fn write_text<W: Write>(writer: &mut W, text: &str) -> Result<(), CliError> {
    writeln!(writer, "{text}").map_err(|e| io_error(&e))
}

/// Writes guidance shown when no operation was selected.
pub fn write_usage<W: Write>(writer: &mut W) -> Result<(), CliError> {
    write_text(writer, USAGE)
}

/// Writes the notification history, oldest first.
pub fn write_history<W: Write>(
    writer: &mut W,
    records: &[NotificationRecord],
) -> Result<(), CliError> {
    if records.is_empty() {
        return write_text(writer, "No notifications sent yet.");
    }

    for record in records {
        let first_line = record.rendered_message.lines().next().unwrap_or_default();
        writeln!(
            writer,
            "{} [{}] {} -> {} ({})",
            record.timestamp, record.outcome, record.sent_by, record.destination, first_line
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes one line per channel.
pub fn write_channels<W: Write>(writer: &mut W, channels: &[Channel]) -> Result<(), CliError> {
    for channel in channels {
        let visibility = if channel.is_private { "private" } else { "public" };
        writeln!(writer, "{}  #{} ({visibility})", channel.id, channel.name)
            .map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "{} channels", channels.len()).map_err(|e| io_error(&e))
}

/// Writes one line per Slack user.
pub fn write_users<W: Write>(writer: &mut W, users: &[SlackUser]) -> Result<(), CliError> {
    for user in users {
        let written = if user.real_name.is_empty() {
            writeln!(writer, "{}  @{}", user.id, user.username)
        } else {
            writeln!(writer, "{}  @{} ({})", user.id, user.username, user.real_name)
        };
        written.map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "{} users", users.len()).map_err(|e| io_error(&e))
}

/// Writes one line per repository.
pub fn write_repositories<W: Write>(
    writer: &mut W,
    repositories: &[Repository],
) -> Result<(), CliError> {
    for repository in repositories {
        let visibility = if repository.private { "private" } else { "public" };
        let language = repository.language.as_deref().unwrap_or("-");
        writeln!(
            writer,
            "{} [{visibility}] {language} (default: {})",
            repository.full_name, repository.default_branch
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "unknown".to_owned(), |value| value.format("%Y-%m-%d %H:%M").to_string())
}

/// Writes a repository summary followed by its branches and latest commit.
pub fn write_repository_details<W: Write>(
    writer: &mut W,
    details: &RepositoryDetails,
) -> Result<(), CliError> {
    let repository = &details.repository;
    let visibility = if repository.private { "private" } else { "public" };
    let lines = [
        format!("{} [{visibility}]", repository.full_name),
        format!(
            "  {}",
            repository.description.as_deref().unwrap_or("No description")
        ),
        format!(
            "  language: {}  default branch: {}",
            repository.language.as_deref().unwrap_or("-"),
            repository.default_branch
        ),
        format!(
            "  stars: {}  watchers: {}  forks: {}  open issues: {}  size: {} KB",
            repository.stars,
            repository.watchers,
            repository.forks,
            repository.open_issues,
            repository.size_kb
        ),
        format!(
            "  created: {}  updated: {}",
            format_date(repository.created_at),
            format_date(repository.updated_at)
        ),
        format!(
            "  {}  {}",
            repository.html_url,
            repository.clone_url.as_deref().unwrap_or_default()
        ),
        format!(
            "  branches ({}): {}",
            details.branch_names.len(),
            details.branch_names.join(", ")
        ),
    ];
    for line in lines.iter().map(|line| line.trim_end()).filter(|line| !line.is_empty()) {
        write_text(writer, line)?;
    }

    match &details.latest_commit {
        Some(commit) => writeln!(
            writer,
            "  latest commit: {} {} ({}, {})",
            commit.short_sha,
            commit.summary,
            commit.author.as_deref().unwrap_or("unknown"),
            format_date(commit.date)
        )
        .map_err(|e| io_error(&e)),
        None => write_text(writer, "  latest commit: none"),
    }
}

/// Writes one line per open issue.
pub fn write_repository_issues<W: Write>(
    writer: &mut W,
    issues: &[RepositoryIssue],
) -> Result<(), CliError> {
    if issues.is_empty() {
        return write_text(writer, "No open issues.");
    }
    for issue in issues {
        writeln!(
            writer,
            "#{} [{}] {} (by {}, {}) {}",
            issue.number,
            issue.state,
            issue.title,
            issue.author,
            format_date(issue.created_at),
            issue.html_url
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes one line per changed file of the working copy.
pub fn write_changed_files<W: Write>(writer: &mut W, files: &[ChangedFile]) -> Result<(), CliError> {
    if files.is_empty() {
        return write_text(writer, "Working tree clean.");
    }
    for file in files {
        writeln!(
            writer,
            "{} {} {} ({})",
            file.kind.icon(),
            file.status,
            file.path,
            file.kind
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes one line per branch, as ordered by the caller.
pub fn write_branches<W: Write>(writer: &mut W, branches: &[Branch]) -> Result<(), CliError> {
    for branch in branches {
        let date = format_date(branch.last_commit_date);
        let author = branch.last_commit_author.as_deref().unwrap_or("unknown");
        let message = branch.last_commit_message.as_deref().unwrap_or_default();
        let lock = if branch.protected { " [protected]" } else { "" };
        writeln!(
            writer,
            "{}{lock}  {date}  {author}  {message}",
            branch.name
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes one line per issue.
pub fn write_issues<W: Write>(writer: &mut W, issues: &[Issue]) -> Result<(), CliError> {
    if issues.is_empty() {
        return write_text(writer, "No issues found.");
    }
    for issue in issues {
        writeln!(
            writer,
            "{} [{}] {} ({}, {}) {}",
            issue.key, issue.status, issue.summary, issue.priority, issue.assignee, issue.url
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the issues assigned to `owner` under a heading naming them.
pub fn write_assigned_issues<W: Write>(
    writer: &mut W,
    owner: Option<&JiraUser>,
    issues: &[Issue],
) -> Result<(), CliError> {
    let name = owner.map_or("you", |user| user.display_name.as_str());
    write_text(writer, &format!("Issues assigned to {name}:"))?;
    write_issues(writer, issues)
}

/// Writes one line per project.
pub fn write_projects<W: Write>(writer: &mut W, projects: &[Project]) -> Result<(), CliError> {
    for project in projects {
        writeln!(
            writer,
            "{}  {} (lead: {}) {}",
            project.key, project.name, project.lead, project.url
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes one line per transition.
pub fn write_transitions<W: Write>(
    writer: &mut W,
    transitions: &[Transition],
) -> Result<(), CliError> {
    for transition in transitions {
        let target = transition
            .to_status
            .as_deref()
            .map_or_else(String::new, |status| format!(" -> {status}"));
        writeln!(writer, "{}  {}{target}", transition.id, transition.name)
            .map_err(|e| io_error(&e))?;
    }
    Ok(())
}
