use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Cleanup;
use tracing::info;

impl Repository {
    /// Move the current branch and the working tree to a commit
    ///
    /// A commit already in the branch history rewinds it; any other commit is
    /// appended as the new head.
    pub async fn reset(&mut self, commit: &str) -> anyhow::Result<()> {
        let commit_id = self.database().resolve_commit(commit)?;
        let target = self.database().parse_object_as_commit(&commit_id)?;
        let head = self.head_commit()?;

        self.migrate_work_tree(head.files(), target.files(), Cleanup::Everything)?;

        let mut branch = self.current_branch()?;
        branch.reset(commit_id.clone());
        self.refs().write_branch(&branch)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.clear();
        index.write_updates()?;

        info!(branch = %branch.name(), head = %commit_id, "reset branch");

        Ok(())
    }
}
