//! Staging area
//!
//! Each branch owns a staging file under `.twig/stage/<branch>` that buffers
//! additions and removals until the next commit. The `Index` is bound to the
//! file of the current branch and is rebound when the current branch changes.
//!
//! ## Staging File Format
//!
//! - Header: signature, version and entry count
//! - Entries: additions then removals, each sorted by file name
//! - Checksum: SHA-1 hash of everything before it

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_PREFIX_SIZE, EntryKind, StageEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::staged_changes::{RemovalOutcome, StageOutcome};
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, StagedChanges, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::{Context, anyhow};
use std::ops::DerefMut;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Index {
    /// Staging file of the branch this index is bound to
    path: Box<Path>,
    changes: StagedChanges,
    header: IndexHeader,
    /// Set when the in-memory changes differ from the file
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            changes: StagedChanges::default(),
            header: IndexHeader::new(String::from(SIGNATURE), VERSION, 0),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn changes(&self) -> &StagedChanges {
        &self.changes
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Bind the index to another branch's staging file
    ///
    /// The in-memory changes are dropped; call `rehydrate` to load the new file.
    pub fn rebind(&mut self, path: Box<Path>) {
        self.path = path;
        self.clear_in_memory();
    }

    fn clear_in_memory(&mut self) {
        self.changes.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the staging file from disk
    ///
    /// A missing or empty file is an empty staging area.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the staging file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear_in_memory();

        if !self.path().exists() {
            return Ok(());
        }

        let mut stage_file = std::fs::OpenOptions::new()
            .read(true)
            .open(self.path())
            .with_context(|| format!("Unable to open staging file {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut stage_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid staging file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported staging file version: {}",
                header.version
            ));
        }

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let prefix = reader.read(ENTRY_PREFIX_SIZE)?;
            let name_len = StageEntry::name_len(&prefix);
            let rest = reader.read(StageEntry::padded_size(name_len) - ENTRY_PREFIX_SIZE)?;

            let entry_bytes = [prefix.to_vec(), rest.to_vec()].concat();
            let entry = StageEntry::deserialize(std::io::Cursor::new(entry_bytes))?;

            match entry.kind {
                EntryKind::Addition => self.changes.additions.insert(entry.name, entry.oid),
                EntryKind::Removal => self.changes.removals.insert(entry.name, entry.oid),
            };
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    /// Stage new content for `name`, see `StagedChanges::stage`
    pub fn stage(&mut self, name: &str, blob: ObjectId, head_blob: Option<&ObjectId>) -> StageOutcome {
        let outcome = self.changes.stage(name, blob, head_blob);
        self.changed = true;
        debug!(file = name, ?outcome, "staged file");

        outcome
    }

    /// Mark `name` for removal, see `StagedChanges::mark_for_removal`
    pub fn mark_for_removal(
        &mut self,
        name: &str,
        head_blob: Option<&ObjectId>,
    ) -> Result<RemovalOutcome, RepositoryError> {
        let outcome = self.changes.mark_for_removal(name, head_blob)?;
        self.changed = true;
        debug!(file = name, ?outcome, "marked file for removal");

        Ok(outcome)
    }

    /// Replace the pending changes wholesale
    pub fn replace(&mut self, changes: StagedChanges) {
        self.changes = changes;
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.changed = true;
    }

    /// Persist the pending changes
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the staging file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut stage_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())
            .with_context(|| format!("Unable to open staging file {}", self.path.display()))?;
        let lock = file_guard::lock(&mut stage_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let entries = self.entries();
        self.header = IndexHeader {
            entries_count: entries.len() as u32,
            ..self.header.clone()
        };
        writer.write(&self.header.serialize()?)?;

        for entry in entries {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }

    fn entries(&self) -> Vec<StageEntry> {
        let additions = self
            .changes
            .additions
            .iter()
            .map(|(name, oid)| StageEntry::new(EntryKind::Addition, oid.clone(), name.clone()));
        let removals = self
            .changes
            .removals
            .iter()
            .map(|(name, oid)| StageEntry::new(EntryKind::Removal, oid.clone(), name.clone()));

        additions.chain(removals).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn blob_id(content: &str) -> ObjectId {
        Blob::from(content).object_id().unwrap()
    }

    #[test]
    fn pending_changes_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stage").join("master").into_boxed_path();
        let mut index = Index::new(path.clone());

        index.stage("a.txt", blob_id("a"), None);
        index.stage("nested/dir/b.txt", blob_id("b"), None);
        index.mark_for_removal("old.txt", Some(&blob_id("old"))).unwrap();
        index.write_updates().unwrap();

        let mut reloaded = Index::new(path);
        reloaded.rehydrate().unwrap();

        assert_eq!(reloaded.changes(), index.changes());
        assert!(!reloaded.is_changed());
    }

    #[test]
    fn missing_file_is_an_empty_stage() {
        let dir = TempDir::new().unwrap();
        let mut index = Index::new(dir.path().join("absent").into_boxed_path());

        index.rehydrate().unwrap();

        assert!(index.changes().is_empty());
    }

    #[test]
    fn corrupted_file_fails_the_checksum() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master").into_boxed_path();
        let mut index = Index::new(path.clone());
        index.stage("a.txt", blob_id("a"), None);
        index.write_updates().unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        assert!(Index::new(path).rehydrate().is_err());
    }

    #[test]
    fn rebinding_switches_to_another_branch() {
        let dir = TempDir::new().unwrap();
        let master = dir.path().join("master").into_boxed_path();
        let mut index = Index::new(master);
        index.stage("a.txt", blob_id("a"), None);
        index.write_updates().unwrap();

        index.rebind(dir.path().join("feature").into_boxed_path());
        index.rehydrate().unwrap();

        assert!(index.changes().is_empty());
    }
}
