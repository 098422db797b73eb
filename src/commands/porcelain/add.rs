use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::staged_changes::StageOutcome;
use crate::artifacts::objects::object::Object;
use crate::errors::RepositoryError;
use std::path::Path;

impl Repository {
    pub async fn add(&mut self, file: &str) -> anyhow::Result<()> {
        if Workspace::is_ignored(Path::new(file)) {
            return Err(RepositoryError::InvalidOperand(format!("cannot stage {file}")).into());
        }
        if !self.workspace().exists(file) {
            return Err(RepositoryError::not_found("file", file).into());
        }

        let index = self.index();
        let mut index = index.lock().await;

        // Load the staging file from the disk
        index.rehydrate()?;

        let head = self.head_commit()?;
        let blob = self.workspace().parse_blob(file)?;
        let blob_id = blob.object_id()?;

        let outcome = index.stage(file, blob_id, head.blob_for(file));
        if matches!(outcome, StageOutcome::Added | StageOutcome::Replaced) {
            self.database().store(&blob)?;
        }

        index.write_updates()?;

        Ok(())
    }
}
