//! Commit history traversal
//!
//! - `rev_list`: first-parent history from a commit back to the root commit
pub mod rev_list;
