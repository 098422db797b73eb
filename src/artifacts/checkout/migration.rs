//! Snapshot migration
//!
//! Moves the working tree from one commit's snapshot to another's, for branch
//! checkouts, resets and fast-forward merges.
//!
//! 1. Plan: load the target snapshot and decide which files to add, rewrite
//!    or delete
//! 2. Check: refuse when an untracked file would be overwritten
//! 3. Apply: delete first, then write
//!
//! All operations are planned before execution so a refused migration leaves
//! the working tree untouched.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::ensure_no_untracked_overwrites;
use crate::artifacts::objects::commit::TrackedFiles;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    Add,
    Delete,
    Modify,
}

/// Which working files a migration deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Files tracked by the source snapshot and absent from the target
    Tracked,
    /// Every working file absent from the target
    Everything,
}

/// Planned actions with the content each write needs
pub type ActionsSet = HashMap<ActionType, Vec<(String, Option<Bytes>)>>;

#[derive(Debug)]
pub struct Migration<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    from: &'r TrackedFiles,
    actions: ActionsSet,
}

impl<'r> Migration<'r> {
    pub fn new(database: &'r Database, workspace: &'r Workspace, from: &'r TrackedFiles) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Migration {
            database,
            workspace,
            from,
            actions,
        }
    }

    pub fn actions(&self) -> &ActionsSet {
        &self.actions
    }

    pub fn actions_of(&self, action: &ActionType) -> impl Iterator<Item = (&str, Option<&[u8]>)> {
        self.actions
            .get(action)
            .into_iter()
            .flatten()
            .map(|(name, content)| (name.as_str(), content.as_deref()))
    }

    /// Plan, check and apply the move to `to`
    pub fn apply_changes(&mut self, to: &TrackedFiles, cleanup: Cleanup) -> anyhow::Result<()> {
        self.plan_changes(to, cleanup)?;

        let writes = self
            .actions_of(&ActionType::Add)
            .chain(self.actions_of(&ActionType::Modify))
            .filter_map(|(name, content)| content.map(|content| (name, content)));
        ensure_no_untracked_overwrites(self.workspace, self.from, writes)?;

        self.workspace.apply_migration(self)
    }

    fn plan_changes(&mut self, to: &TrackedFiles, cleanup: Cleanup) -> anyhow::Result<()> {
        for (name, blob_id) in to {
            let content = self.database.parse_object_as_blob(blob_id)?.into_content();
            let action = if self.workspace.exists(name) {
                ActionType::Modify
            } else {
                ActionType::Add
            };

            self.record(action, name.clone(), Some(content));
        }

        let stale = match cleanup {
            Cleanup::Tracked => self.from.keys().cloned().collect::<Vec<_>>(),
            Cleanup::Everything => self.workspace.list_files()?,
        };
        for name in stale.into_iter().filter(|name| !to.contains_key(name)) {
            self.record(ActionType::Delete, name, None);
        }

        debug!(
            add = self.actions[&ActionType::Add].len(),
            modify = self.actions[&ActionType::Modify].len(),
            delete = self.actions[&ActionType::Delete].len(),
            "planned migration"
        );

        Ok(())
    }

    fn record(&mut self, action: ActionType, name: String, content: Option<Bytes>) {
        self.actions.entry(action).or_default().push((name, content));
    }
}
