use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Entries the working tree never reports or touches
pub static RESERVED_NAMES: phf::Set<&'static str> = phf::phf_set! {
    ".twig",
    ".",
    "..",
};

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hidden names start with a dot; reserved ones belong to the repository
    pub fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let Component::Normal(name) = component {
                let name = name.to_string_lossy();
                RESERVED_NAMES.contains(name.as_ref()) || name.starts_with('.')
            } else {
                false
            }
        })
    }

    /// List every regular file of the working tree, as `/`-separated names
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let mut files = WalkDir::new(&self.path)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| RESERVED_NAMES.contains(name) || name.starts_with('.'))
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.file_name(entry.path()))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn file_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        if Self::is_ignored(relative) {
            return None;
        }

        Some(
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.full_path(name).is_file()
    }

    pub fn read_file(&self, name: &str) -> anyhow::Result<Bytes> {
        let path = self.full_path(name);
        let content =
            std::fs::read(&path).with_context(|| format!("Unable to read file {:?}", path))?;

        Ok(content.into())
    }

    pub fn try_read_file(&self, name: &str) -> anyhow::Result<Option<Bytes>> {
        if self.exists(name) {
            Ok(Some(self.read_file(name)?))
        } else {
            Ok(None)
        }
    }

    pub fn parse_blob(&self, name: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(name)?))
    }

    pub fn write_file(&self, name: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.full_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;

        Ok(())
    }

    /// Delete a file and any directories it leaves empty
    pub fn remove_file(&self, name: &str) -> anyhow::Result<()> {
        let path = self.full_path(name);
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", path))?;
        }

        self.prune_empty_parent_dirs(&path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.starts_with(self.path.as_ref())
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    // Deletions go first so a file can replace a directory emptied by them.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for action in [ActionType::Delete, ActionType::Modify, ActionType::Add] {
            for (name, content) in migration.actions_of(&action) {
                match (&action, content) {
                    (ActionType::Delete, _) => self.remove_file(name)?,
                    (ActionType::Add | ActionType::Modify, Some(content)) => {
                        self.write_file(name, content)?
                    }
                    _ => anyhow::bail!("Invalid action and content combination for {name}"),
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn listing_skips_hidden_and_reserved_entries() {
        let dir = TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("nested/b.txt").write_str("b").unwrap();
        dir.child(".hidden").write_str("h").unwrap();
        dir.child(".twig/HEAD").write_str("master").unwrap();
        let workspace = Workspace::new(dir.path().into());

        assert_eq!(workspace.list_files().unwrap(), vec!["a.txt", "nested/b.txt"]);
    }

    #[test]
    fn removing_the_last_file_prunes_its_directory() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().into());
        workspace.write_file("deep/er/c.txt", b"c").unwrap();

        workspace.remove_file("deep/er/c.txt").unwrap();

        assert!(!dir.child("deep").exists());
    }
}
