//! Local working-copy operations.
//!
//! This module lists changed files of the Git repository under a path,
//! shows their diffs, stages or unstages them, commits the index and reports
//! the current branch. Everything runs through `git2`; no `git` executable
//! is needed.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use qa_generator::local::{Git2WorkingCopy, WorkingCopy};
//!
//! let working_copy = Git2WorkingCopy::discover(Path::new(".")).expect("repository");
//! for file in working_copy.changed_files().expect("status") {
//!     println!("{} {} {}", file.kind.icon(), file.status, file.path);
//! }
//! ```

mod error;
mod status;
mod working_copy;

pub use error::LocalGitError;
pub use status::{ChangeKind, ChangedFile};
pub use working_copy::{CommitOutcome, DETACHED_HEAD, Git2WorkingCopy, NO_CHANGES, WorkingCopy};
