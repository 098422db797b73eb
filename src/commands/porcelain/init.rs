use crate::areas::repository::Repository;
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::fs;
use std::io::Write;
use tracing::info;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::PreconditionFailed(
                "A twig version-control system already exists in the current directory."
                    .into(),
            )
            .into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .twig/objects directory")?;
        fs::create_dir_all(self.refs().branches_path())
            .context("Failed to create .twig/branches directory")?;
        fs::create_dir_all(self.remotes().path())
            .context("Failed to create .twig/remotes directory")?;

        let root_id = self.database().store(&Commit::root())?;
        let master = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs()
            .create_branch(&Branch::new(master.clone(), root_id.clone()))
            .context("Failed to create the default branch")?;
        self.refs()
            .set_current_branch(&master)
            .context("Failed to create HEAD")?;

        let index = self.index();
        let mut index = index.lock().await;
        index.clear();
        index.write_updates()?;

        info!(root = %root_id, "initialized repository");
        writeln!(
            self.writer(),
            "Initialized twig directory at {}",
            self.path().display()
        )?;

        Ok(())
    }
}
