//! Core repository components
//!
//! - `database`: object store for blobs and commits
//! - `index`: per-branch staging area
//! - `refs`: branches and the current-branch marker
//! - `remotes`: remote descriptors and the filesystem remote
//! - `repository`: the context threaded through every command
//! - `workspace`: working tree file operations

pub mod database;
pub mod index;
pub mod refs;
pub mod remotes;
pub mod repository;
pub mod workspace;
