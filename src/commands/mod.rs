//! Command implementations
//!
//! - `plumbing`: direct access to the object store (hash-object, cat-file)
//! - `porcelain`: user-facing version control workflows (add, commit, merge, ...)
//!
//! Plumbing commands expose the store's put and get; porcelain commands
//! compose the store, refs, staging area and working tree.

pub mod plumbing;
pub mod porcelain;
