//! Working tree migration and the untracked-file safety check
//!
//! Every operation that rewrites the working tree from a snapshot plans its
//! writes first and checks them against untracked files before touching
//! anything.

pub mod conflict;
pub mod migration;
