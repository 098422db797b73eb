//! Branches and the current-branch marker
//!
//! Every branch is a text file under `.twig/branches/<name>` holding its head
//! and history. `.twig/HEAD` holds the name of the current branch.

use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use tracing::debug;

/// Name of the current-branch marker file
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.twig`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn branches_path(&self) -> Box<Path> {
        self.path.join("branches").into_boxed_path()
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.branches_path().join(name.as_ref()).into_boxed_path()
    }

    /// Name of the currently checked-out branch
    pub fn current_branch_name(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        BranchName::try_parse(content.trim().to_string())
    }

    pub fn set_current_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(self.head_path(), name.to_string())?;
        debug!(branch = %name, "switched current branch");

        Ok(())
    }

    pub fn current_branch(&self) -> anyhow::Result<Branch> {
        self.read_branch(&self.current_branch_name()?)
    }

    pub fn is_current_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch_name()? == name)
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn try_read_branch(&self, name: &BranchName) -> anyhow::Result<Option<Branch>> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read branch file at {:?}", branch_path))?;

        Ok(Some(Branch::deserialize(name.clone(), &content)?))
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Branch> {
        self.try_read_branch(name)?
            .ok_or_else(|| RepositoryError::not_found("branch", name.as_ref()).into())
    }

    pub fn write_branch(&self, branch: &Branch) -> anyhow::Result<()> {
        self.update_ref_file(self.branch_path(branch.name()), branch.serialize())?;
        debug!(branch = %branch.name(), head = %branch.head(), "updated branch");

        Ok(())
    }

    pub fn create_branch(&self, branch: &Branch) -> anyhow::Result<()> {
        if self.branch_exists(branch.name()) {
            return Err(RepositoryError::PreconditionFailed(
                "A branch with that name already exists.".into(),
            )
            .into());
        }

        self.write_branch(branch)
    }

    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(RepositoryError::not_found("branch", name.as_ref()).into());
        }

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        debug!(branch = %name, "deleted branch");

        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let branches_path = self.branches_path();
        if !branches_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = std::fs::read_dir(&branches_path)
            .with_context(|| format!("failed to list branches at {:?}", branches_path))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| BranchName::try_parse(entry.file_name().to_string_lossy().into()).ok())
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    pub fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }
}
