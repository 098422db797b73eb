//! Staging area file format and staging rules
//!
//! Every branch owns one staging file that buffers pending additions and
//! removals until the next commit.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "STGE" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Kind (1 byte): 0 = addition, 1 = removal
//!   - Blob id (41 bytes)
//!   - Name length (2 bytes)
//!   - Name, NUL terminated, padded to 8-byte alignment
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;
pub mod staged_changes;

pub use staged_changes::StagedChanges;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of staging file header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying staging files
pub const SIGNATURE: &str = "STGE";

/// Staging file format version
pub const VERSION: u32 = 1;
