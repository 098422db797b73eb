use crate::areas::repository::Repository;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use anyhow::Context;

impl Repository {
    /// Create a branch at the current head, sharing the current history
    pub fn branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let current = self.current_branch()?;

        self.refs()
            .create_branch(&Branch::fork(branch_name, &current))?;

        Ok(())
    }

    /// Delete a branch pointer and its staging file; commits stay
    pub fn rm_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| RepositoryError::NoSuchBranch(branch_name.to_string()))?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::PreconditionFailed(
                "Cannot remove the current branch.".into(),
            )
            .into());
        }
        if !self.refs().branch_exists(&branch_name) {
            return Err(RepositoryError::NoSuchBranch(branch_name.to_string()).into());
        }

        self.refs().delete_branch(&branch_name)?;

        let stage_path = self.stage_path(&branch_name);
        if stage_path.exists() {
            std::fs::remove_file(&stage_path)
                .with_context(|| format!("Unable to remove staging file {:?}", stage_path))?;
        }

        Ok(())
    }
}
