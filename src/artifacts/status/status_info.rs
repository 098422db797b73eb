//! Status classification
//!
//! - staged: pending additions
//! - removed: pending removals
//! - not staged: head-tracked files edited or deleted without staging, and
//!   staged files edited or deleted after staging
//! - untracked: working files neither tracked by the head nor staged

use crate::areas::workspace::Workspace;
use crate::artifacts::index::StagedChanges;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeSet = BTreeMap<String, WorkspaceChangeType>;
pub type FileSet = BTreeSet<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    pub workspace_changeset: ChangeSet,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    workspace: &'r Workspace,
    head: &'r TrackedFiles,
    staged: &'r StagedChanges,
}

impl Status<'_> {
    pub fn initialize(&self) -> anyhow::Result<StatusInfo> {
        let working_files = self.workspace.list_files()?;
        let mut workspace_changeset = ChangeSet::new();

        for (name, blob_id) in self.head {
            if self.staged.is_staged(name) {
                continue;
            }

            match self.working_blob_id(name)? {
                Some(working_id) if &working_id != blob_id => {
                    workspace_changeset.insert(name.clone(), WorkspaceChangeType::Modified);
                }
                None if !self.staged.is_removed(name) => {
                    workspace_changeset.insert(name.clone(), WorkspaceChangeType::Deleted);
                }
                _ => {}
            }
        }

        for (name, blob_id) in &self.staged.additions {
            match self.working_blob_id(name)? {
                Some(working_id) if &working_id != blob_id => {
                    workspace_changeset.insert(name.clone(), WorkspaceChangeType::Modified);
                }
                None => {
                    workspace_changeset.insert(name.clone(), WorkspaceChangeType::Deleted);
                }
                _ => {}
            }
        }

        let untracked_files = working_files
            .into_iter()
            .filter(|name| !self.head.contains_key(name) && !self.staged.is_staged(name))
            .collect();

        Ok(StatusInfo {
            staged_files: self.staged.additions.keys().cloned().collect(),
            removed_files: self.staged.removals.keys().cloned().collect(),
            workspace_changeset,
            untracked_files,
        })
    }

    fn working_blob_id(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        match self.workspace.try_read_file(name)? {
            Some(content) => Ok(Some(Blob::new(content).object_id()?)),
            None => Ok(None),
        }
    }
}
