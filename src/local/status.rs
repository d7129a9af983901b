//! Changed-file classification in `git status --porcelain` terms.

use std::fmt;

use git2::Status;
use serde::Serialize;

/// How a file differs from `HEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    /// Content or type changed.
    Modified,
    /// Newly added to the index.
    Added,
    /// Removed.
    Deleted,
    /// Moved to a new path.
    Renamed,
    /// Copied from another path.
    Copied,
    /// Present in the working directory only.
    Untracked,
    /// Any other combination, e.g. a conflict.
    Unknown,
}

impl ChangeKind {
    /// Classifies a two-character porcelain code. A letter in either column
    /// counts, checked in the order `M`, `A`, `D`, `R`, `C`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        if code == "??" {
            return Self::Untracked;
        }
        let has = |letters: &[char]| code.chars().any(|column| letters.contains(&column));
        [
            (&['M', 'T'][..], Self::Modified),
            (&['A'][..], Self::Added),
            (&['D'][..], Self::Deleted),
            (&['R'][..], Self::Renamed),
            (&['C'][..], Self::Copied),
        ]
        .into_iter()
        .find_map(|(letters, kind)| has(letters).then_some(kind))
        .unwrap_or(Self::Unknown)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Modified => "Modified",
            Self::Added => "New",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
            Self::Copied => "Copied",
            Self::Untracked => "Untracked",
            Self::Unknown => "Unknown",
        }
    }

    /// Emoji shown next to the file in listings.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Modified => "📝",
            Self::Added => "➕",
            Self::Deleted => "❌",
            Self::Renamed => "🔄",
            Self::Copied => "📋",
            Self::Untracked => "❓",
            Self::Unknown => "📄",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A file that differs from `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Path relative to the working directory; the new path for renames.
    pub path: String,
    /// Porcelain code: index column then working-tree column, e.g. `M ` or
    /// `??`.
    pub status: String,
    /// Classification of `status`.
    pub kind: ChangeKind,
}

impl ChangedFile {
    pub(crate) fn new(path: String, status: String) -> Self {
        let kind = ChangeKind::from_code(&status);
        Self { path, status, kind }
    }
}

/// Translates git2 status flags into a porcelain code; `None` for files
/// that are unchanged or ignored.
pub(crate) fn porcelain_code(status: Status) -> Option<String> {
    if status.is_empty() || status.contains(Status::IGNORED) {
        return None;
    }
    if status == Status::WT_NEW {
        return Some("??".to_owned());
    }
    if status.contains(Status::CONFLICTED) {
        return Some("UU".to_owned());
    }

    let index = [
        (Status::INDEX_NEW, 'A'),
        (Status::INDEX_MODIFIED, 'M'),
        (Status::INDEX_DELETED, 'D'),
        (Status::INDEX_RENAMED, 'R'),
        (Status::INDEX_TYPECHANGE, 'T'),
    ];
    let worktree = [
        (Status::WT_MODIFIED, 'M'),
        (Status::WT_DELETED, 'D'),
        (Status::WT_RENAMED, 'R'),
        (Status::WT_TYPECHANGE, 'T'),
    ];
    let column = |flags: &[(Status, char)]| {
        flags
            .iter()
            .find_map(|(flag, letter)| status.contains(*flag).then_some(*letter))
            .unwrap_or(' ')
    };

    let code: String = [column(&index), column(&worktree)].iter().collect();
    (code != "  ").then_some(code)
}
