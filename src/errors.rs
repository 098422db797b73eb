//! Domain errors surfaced to the user
//!
//! Every command failure a user can trigger is one of these variants. They are
//! raised through `anyhow` (so I/O context still composes with `?`) and can be
//! recovered with `downcast_ref::<RepositoryError>()` when a caller needs the
//! kind rather than the message.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A missing object, commit, blob, branch, remote, stage or file.
    #[error("No {what} with that name found: {name}")]
    NotFound { what: &'static str, name: String },

    /// An abbreviated commit id matched more than one commit.
    #[error("Commit id {prefix} is ambiguous; candidates are:\n{}", .candidates.join("\n"))]
    AmbiguousId {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("Incorrect operands: {0}")]
    InvalidOperand(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("A branch with that name does not exist.")]
    NoSuchBranch(String),

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("Given branch is an ancestor of the current branch.")]
    AlreadyAncestor,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict(Vec<PathBuf>),

    #[error("No changes added to the commit.")]
    EmptyCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No reason to remove the file.")]
    NothingToRemove(String),
}

impl RepositoryError {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            what,
            name: name.into(),
        }
    }
}

/// Extract the domain error from an `anyhow` chain, if there is one.
pub fn repository_error(error: &anyhow::Error) -> Option<&RepositoryError> {
    error.downcast_ref::<RepositoryError>()
}
