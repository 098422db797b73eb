use crate::areas::repository::Repository;
use crate::artifacts::index::StagedChanges;
use crate::artifacts::objects::commit::{Commit, Parentage};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use tracing::info;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        // Load the staging file from the disk
        index.rehydrate()?;

        if index.changes().is_empty() {
            return Err(RepositoryError::EmptyCommit.into());
        }
        if message.trim().is_empty() {
            return Err(RepositoryError::EmptyMessage.into());
        }

        let mut branch = self.current_branch()?;
        let parentage = Parentage::Single(branch.head().clone());
        let commit_id = self.write_commit(parentage, index.changes(), message)?;

        branch.advance_head(commit_id);
        self.refs().write_branch(&branch)?;

        index.clear();
        index.write_updates()?;

        Ok(())
    }

    /// Snapshot the staged changes on top of the first parent and store the result
    ///
    /// The commit object is written before any branch is pointed at it.
    pub(crate) fn write_commit(
        &self,
        parentage: Parentage,
        staged: &StagedChanges,
        message: &str,
    ) -> anyhow::Result<ObjectId> {
        let base = match parentage.first() {
            Some(parent) => self.database().parse_object_as_commit(parent)?.files().clone(),
            None => Default::default(),
        };

        let commit = Commit::snapshot(
            parentage,
            &base,
            staged,
            Commit::timestamp_from_env(),
            message.to_string(),
        );
        let commit_id = self.database().store(&commit)?;
        info!(
            commit = %commit_id,
            files = commit.files().len(),
            merge = commit.is_merge(),
            message = %commit.short_message(),
            "created commit"
        );

        Ok(commit_id)
    }
}
