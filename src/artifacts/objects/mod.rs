//! Object types and operations
//!
//! Every stored entity is an immutable object identified by a tagged SHA-1:
//!
//! - **Blob**: File content (raw bytes)
//! - **Commit**: Snapshot of the complete tracked file set with parent linkage
//!
//! All objects implement serialization/deserialization of their canonical
//! body; the store frames it as `<type> <size>\0<body>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of an object id: one tag character and a 40-character SHA-1
pub const OBJECT_ID_LENGTH: usize = 41;
