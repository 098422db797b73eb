//! Remote descriptors
//!
//! A remote is a name recorded under `.twig/remotes/<name>`, pointing at the
//! metadata directory of another repository and at its working tree. Both
//! paths are resolved once, when the remote is added.
//!
//! ## File Format
//!
//! ```text
//! repository <path to the remote .twig directory>
//! worktree <path to the remote working tree>
//! ```

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::repository::METADATA_DIR;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::StagedChanges;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::remote::RemoteEndpoint;
use crate::errors::RepositoryError;
use anyhow::{Context, anyhow};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub name: String,
    pub repository: PathBuf,
    pub worktree: PathBuf,
}

impl RemoteDescriptor {
    /// Describe the repository at `location`, relative paths taken from `base`
    ///
    /// `location` may name either the metadata directory or the working tree
    /// that contains it.
    pub fn resolve(name: &str, location: &str, base: &Path) -> Self {
        let location = base.join(location);

        let (repository, worktree) = match location.file_name() {
            Some(file_name) if file_name == METADATA_DIR => {
                let worktree = location
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| location.clone());
                (location, worktree)
            }
            _ => (location.join(METADATA_DIR), location),
        };

        RemoteDescriptor {
            name: name.to_string(),
            repository,
            worktree,
        }
    }

    fn serialize(&self) -> String {
        format!(
            "repository {}\nworktree {}\n",
            self.repository.display(),
            self.worktree.display()
        )
    }

    fn deserialize(name: &str, content: &str) -> anyhow::Result<Self> {
        let mut repository = None;
        let mut worktree = None;

        for line in content.lines().filter(|line| !line.is_empty()) {
            match line.split_once(' ') {
                Some(("repository", path)) => repository = Some(PathBuf::from(path)),
                Some(("worktree", path)) => worktree = Some(PathBuf::from(path)),
                _ => return Err(anyhow!("Invalid remote descriptor line for {name}: {line}")),
            }
        }

        Ok(RemoteDescriptor {
            name: name.to_string(),
            repository: repository.ok_or_else(|| anyhow!("Remote {name} has no repository"))?,
            worktree: worktree.ok_or_else(|| anyhow!("Remote {name} has no working tree"))?,
        })
    }
}

#[derive(Debug)]
pub struct Remotes {
    /// Path to the remotes directory (typically `.twig/remotes`)
    path: Box<Path>,
}

impl Remotes {
    pub fn new(path: Box<Path>) -> Self {
        Remotes { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Names of every configured remote, sorted
    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        if !self.path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = std::fs::read_dir(&self.path)
            .with_context(|| format!("Unable to list remotes in {:?}", self.path))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    pub fn add(&self, descriptor: &RemoteDescriptor) -> anyhow::Result<()> {
        let descriptor_path = self.descriptor_path(&descriptor.name);
        if descriptor_path.exists() {
            return Err(RepositoryError::PreconditionFailed(
                "A remote with that name already exists.".into(),
            )
            .into());
        }

        std::fs::create_dir_all(&self.path)?;
        std::fs::write(&descriptor_path, descriptor.serialize())
            .with_context(|| format!("Unable to write remote {:?}", descriptor_path))?;
        info!(remote = %descriptor.name, repository = ?descriptor.repository, "added remote");

        Ok(())
    }

    pub fn remove(&self, name: &str) -> anyhow::Result<()> {
        let descriptor_path = self.descriptor_path(name);
        if !descriptor_path.is_file() {
            return Err(RepositoryError::not_found("remote", name).into());
        }

        std::fs::remove_file(&descriptor_path)
            .with_context(|| format!("Unable to remove remote {:?}", descriptor_path))?;

        Ok(())
    }

    pub fn read(&self, name: &str) -> anyhow::Result<RemoteDescriptor> {
        let descriptor_path = self.descriptor_path(name);
        if !descriptor_path.is_file() {
            return Err(RepositoryError::not_found("remote", name).into());
        }

        let content = std::fs::read_to_string(&descriptor_path)
            .with_context(|| format!("Unable to read remote {:?}", descriptor_path))?;

        RemoteDescriptor::deserialize(name, &content)
    }

    /// Connect to a named remote
    pub fn open(&self, name: &str) -> anyhow::Result<Box<dyn RemoteEndpoint>> {
        let descriptor = self.read(name)?;

        Ok(Box::new(FsRemote::open(&descriptor)?))
    }
}

/// A remote repository on the local filesystem
#[derive(Debug)]
pub struct FsRemote {
    database: Database,
    refs: Refs,
    workspace: Workspace,
    stage_path: Box<Path>,
}

impl FsRemote {
    pub fn open(descriptor: &RemoteDescriptor) -> anyhow::Result<Self> {
        if !descriptor.repository.is_dir() {
            return Err(RepositoryError::not_found(
                "remote directory",
                descriptor.repository.display().to_string(),
            )
            .into());
        }
        debug!(remote = %descriptor.name, "opened remote");

        let repository = &descriptor.repository;
        Ok(FsRemote {
            database: Database::new(repository.join("objects").into_boxed_path()),
            refs: Refs::new(repository.clone().into_boxed_path()),
            workspace: Workspace::new(descriptor.worktree.clone().into_boxed_path()),
            stage_path: repository.join("stage").into_boxed_path(),
        })
    }
}

impl RemoteEndpoint for FsRemote {
    fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        self.refs.list_branches()
    }

    fn fetch_object(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        self.database.load_raw(object_id)
    }

    fn fetch_branch(&self, name: &BranchName) -> anyhow::Result<Option<Branch>> {
        self.refs.try_read_branch(name)
    }

    fn fetch_stage(&self, name: &BranchName) -> anyhow::Result<StagedChanges> {
        let mut index = Index::new(self.stage_path.join(name.as_ref()).into_boxed_path());
        index.rehydrate()?;

        Ok(index.changes().clone())
    }

    fn has_object(&self, object_id: &ObjectId) -> bool {
        self.database.contains(object_id)
    }

    fn store_object(&self, object_id: &ObjectId, content: Bytes) -> anyhow::Result<()> {
        self.database.store_raw(object_id, content)
    }

    fn write_branch(&self, branch: &Branch) -> anyhow::Result<()> {
        self.refs.write_branch(branch)
    }

    fn replace_work_tree(&self, files: &[(String, Bytes)]) -> anyhow::Result<()> {
        for name in self.workspace.list_files()? {
            self.workspace.remove_file(&name)?;
        }
        for (name, content) in files {
            self.workspace.write_file(name, content)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn metadata_dir_location_points_at_its_parent_tree() {
        let base = Path::new("/work/local");

        let descriptor = RemoteDescriptor::resolve("origin", "../other/.twig", base);

        assert_eq!(descriptor.repository, base.join("../other/.twig"));
        assert_eq!(descriptor.worktree, base.join("../other"));
    }

    #[test]
    fn tree_location_gets_the_metadata_dir_appended() {
        let descriptor = RemoteDescriptor::resolve("origin", "/srv/shared", Path::new("/work"));

        assert_eq!(descriptor.repository, PathBuf::from("/srv/shared/.twig"));
        assert_eq!(descriptor.worktree, PathBuf::from("/srv/shared"));
    }

    #[test]
    fn descriptors_round_trip_through_the_remotes_dir() {
        let dir = TempDir::new().unwrap();
        let remotes = Remotes::new(dir.path().join("remotes").into_boxed_path());
        let descriptor = RemoteDescriptor::resolve("origin", "/srv/shared/.twig", dir.path());

        remotes.add(&descriptor).unwrap();

        assert_eq!(remotes.list().unwrap(), vec!["origin".to_string()]);
        assert_eq!(remotes.read("origin").unwrap(), descriptor);
        assert!(remotes.add(&descriptor).is_err());
        remotes.remove("origin").unwrap();
        assert!(remotes.read("origin").is_err());
        assert!(remotes.list().unwrap().is_empty());
    }

    #[test]
    fn missing_remote_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let descriptor = RemoteDescriptor::resolve("origin", "nowhere/.twig", dir.path());

        let err = FsRemote::open(&descriptor).unwrap_err();

        assert!(matches!(
            crate::errors::repository_error(&err),
            Some(RepositoryError::NotFound { what: "remote directory", .. })
        ));
    }
}
