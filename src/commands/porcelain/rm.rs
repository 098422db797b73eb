use crate::areas::repository::Repository;
use crate::artifacts::index::staged_changes::RemovalOutcome;

impl Repository {
    pub async fn rm(&mut self, file: &str) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let head = self.head_commit()?;
        let outcome = index.mark_for_removal(file, head.blob_for(file))?;

        // the removal is persisted before the working copy goes away
        index.write_updates()?;
        if outcome == RemovalOutcome::Removed {
            self.workspace().remove_file(file)?;
        }

        Ok(())
    }
}
