//! Merge engine
//!
//! - `split_point`: split point search over branch history lists
//! - `resolution`: per-file three-way resolution and the merge plan
//! - `conflict`: conflict marker content

pub mod conflict;
pub mod resolution;
pub mod split_point;
