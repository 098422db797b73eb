use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::{Cleanup, Migration};
use crate::artifacts::objects::commit::{Commit, TrackedFiles};
use crate::errors::RepositoryError;
use tracing::info;

impl Repository {
    /// Restore `file` from the current head
    pub async fn checkout_file(&mut self, file: &str) -> anyhow::Result<()> {
        let head = self.head_commit()?;

        self.restore_file(&head, file)
    }

    /// Restore `file` from the commit named by an id or unique id prefix
    pub async fn checkout_file_from(&mut self, commit: &str, file: &str) -> anyhow::Result<()> {
        let commit_id = self.database().resolve_commit(commit)?;
        let commit = self.database().parse_object_as_commit(&commit_id)?;

        self.restore_file(&commit, file)
    }

    /// Switch to another branch, moving the working tree to its head
    pub async fn checkout_branch(&mut self, target: &str) -> anyhow::Result<()> {
        let target = BranchName::try_parse_operand(target)
            .map_err(|_| RepositoryError::NoSuchBranch(target.to_string()))?;
        let target_branch = self
            .refs()
            .try_read_branch(&target)?
            .ok_or_else(|| RepositoryError::NoSuchBranch(target.to_string()))?;

        if self.refs().is_current_branch(&target)? {
            return Err(RepositoryError::PreconditionFailed(
                "No need to checkout the current branch.".into(),
            )
            .into());
        }

        let head = self.head_commit()?;
        let target_commit = self
            .database()
            .parse_object_as_commit(target_branch.head())?;
        self.migrate_work_tree(head.files(), target_commit.files(), Cleanup::Tracked)?;

        self.refs().set_current_branch(&target)?;
        self.switch_stage(&target).await?;
        info!(branch = %target, head = %target_branch.head(), "checked out branch");

        Ok(())
    }

    fn restore_file(&self, commit: &Commit, file: &str) -> anyhow::Result<()> {
        let blob_id = commit
            .blob_for(file)
            .ok_or_else(|| RepositoryError::not_found("file", file))?;
        let blob = self.database().parse_object_as_blob(blob_id)?;

        self.workspace().write_file(file, blob.content())
    }

    /// Move the working tree from one snapshot to another
    ///
    /// Nothing is touched when an untracked file is in the way.
    pub(crate) fn migrate_work_tree(
        &self,
        from: &TrackedFiles,
        to: &TrackedFiles,
        cleanup: Cleanup,
    ) -> anyhow::Result<()> {
        let mut migration = Migration::new(self.database(), self.workspace(), from);

        migration.apply_changes(to, cleanup)
    }

    /// Clear the staging area and bind it to `branch`, cleared as well
    pub(crate) async fn switch_stage(&self, branch: &BranchName) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.clear();
        index.write_updates()?;

        index.rebind(self.stage_path(branch));
        index.clear();
        index.write_updates()?;

        Ok(())
    }
}
