//! Data structures and algorithms
//!
//! - `branch`: branch names and branch histories
//! - `checkout`: working tree migration and the untracked-file check
//! - `core`: terminal output (pager wrapper)
//! - `index`: staging area data structures and their binary format
//! - `log`: first-parent history traversal
//! - `merge`: split point search, per-file resolution and conflict content
//! - `objects`: object types (blob, commit) and ids
//! - `remote`: the capability through which remotes are reached
//! - `status`: working tree status classification

pub mod branch;
pub mod checkout;
pub mod core;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod remote;
pub mod status;
