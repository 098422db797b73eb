//! Porcelain commands (user-facing operations)
//!
//! Each command is an `async` method on `Repository` that writes its report
//! through the repository writer.
//!
//! ## Commands
//!
//! - `init`: Create a repository with its root commit and `master` branch
//! - `add`, `rm`: Stage additions and removals
//! - `commit`: Snapshot the staging area
//! - `log`: First-parent history, every commit, or commits by message
//! - `status`: Branches, staged changes and working tree changes
//! - `checkout`: Restore a file or switch branches
//! - `branch`: Create or delete branches
//! - `reset`: Move the current branch and working tree to a commit
//! - `merge`: Three-way merge from the split point
//! - `remote`: Remote descriptors, push, fetch and pull

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod remote;
pub mod reset;
pub mod rm;
pub mod status;
