//! Remote repository capability
//!
//! Push, fetch and pull only ever reach another repository through
//! `RemoteEndpoint`. The filesystem implementation lives in
//! `areas::remotes`.

use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::StagedChanges;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;

pub trait RemoteEndpoint {
    fn list_branches(&self) -> anyhow::Result<Vec<BranchName>>;

    /// Stored bytes of an object, exactly as the remote keeps them
    fn fetch_object(&self, object_id: &ObjectId) -> anyhow::Result<Bytes>;

    fn fetch_branch(&self, name: &BranchName) -> anyhow::Result<Option<Branch>>;

    /// Pending changes of a remote branch
    fn fetch_stage(&self, name: &BranchName) -> anyhow::Result<StagedChanges>;

    fn has_object(&self, object_id: &ObjectId) -> bool;

    fn store_object(&self, object_id: &ObjectId, content: Bytes) -> anyhow::Result<()>;

    fn write_branch(&self, branch: &Branch) -> anyhow::Result<()>;

    /// Replace every non-hidden file of the remote working tree
    fn replace_work_tree(&self, files: &[(String, Bytes)]) -> anyhow::Result<()>;
}
