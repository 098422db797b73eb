//! Working tree status inspection
//!
//! Compares the working tree against the current head and the staging area.
//!
//! ## Components
//!
//! - `file_change`: kinds of changes not staged for commit
//! - `status_info`: status classification of every file

pub mod file_change;
pub mod status_info;
