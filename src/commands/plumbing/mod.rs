//! Plumbing commands (low-level object store access)
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob id and optionally store the blob
//! - `cat-file`: Print the body of a stored object

pub mod cat_file;
pub mod hash_object;
