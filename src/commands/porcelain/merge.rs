use crate::areas::repository::Repository;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ensure_no_untracked_overwrites;
use crate::artifacts::checkout::migration::Cleanup;
use crate::artifacts::merge::conflict::conflict_content;
use crate::artifacts::merge::resolution::{FileResolution, MergePlan};
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, Parentage};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::io::Write;
use tracing::{debug, info};

/// How a merge ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch only caught up with the target; no commit was made
    FastForwarded,
    /// A two-parent commit was made
    Merged { conflicted: bool },
}

/// A working-tree change the merge will carry out
enum MergeAction {
    Write { content: Bytes, blob: Blob },
    Remove,
}

impl Repository {
    /// Merge the branch named `target` into the current branch
    ///
    /// `target` may use the `remote/branch` spelling of a fetched branch. A
    /// fetched branch is named by that spelling in the merge message, however
    /// it was typed.
    pub async fn merge(&mut self, target: &str) -> anyhow::Result<MergeOutcome> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if !index.changes().is_empty() {
            return Err(RepositoryError::UncommittedChanges.into());
        }

        let target_name = BranchName::try_parse_operand(target)
            .map_err(|_| RepositoryError::NoSuchBranch(target.to_string()))?;
        let target_branch = self
            .refs()
            .try_read_branch(&target_name)?
            .ok_or_else(|| RepositoryError::NoSuchBranch(target.to_string()))?;
        let mut current_branch = self.current_branch()?;
        if current_branch.name() == target_branch.name() {
            return Err(RepositoryError::SelfMerge.into());
        }

        let split_point = self.find_split_point(&current_branch, &target_branch)?;
        if &split_point == target_branch.head() {
            return Err(RepositoryError::AlreadyAncestor.into());
        }

        let head = self.head_commit()?;
        let target_commit = self
            .database()
            .parse_object_as_commit(target_branch.head())?;

        if &split_point == current_branch.head() {
            self.migrate_work_tree(head.files(), target_commit.files(), Cleanup::Tracked)?;

            current_branch.fast_forward(&target_branch);
            self.refs().write_branch(&current_branch)?;
            index.clear();
            index.write_updates()?;

            info!(branch = %current_branch.name(), head = %current_branch.head(), "fast-forwarded");
            writeln!(self.writer(), "Current branch fast-forwarded.")?;

            return Ok(MergeOutcome::FastForwarded);
        }

        let split_commit = self.database().parse_object_as_commit(&split_point)?;
        let plan = MergePlan::build(split_commit.files(), head.files(), target_commit.files());
        let actions = self.plan_merge_actions(&plan)?;

        let writes = actions.iter().filter_map(|(name, action)| match action {
            MergeAction::Write { content, .. } => Some((name.as_str(), &content[..])),
            MergeAction::Remove => None,
        });
        ensure_no_untracked_overwrites(self.workspace(), head.files(), writes)?;

        for (name, action) in &actions {
            match action {
                MergeAction::Write { content, blob } => {
                    let blob_id = self.database().store(blob)?;
                    self.workspace().write_file(name, content)?;
                    index.stage(name, blob_id, head.blob_for(name));
                }
                MergeAction::Remove => {
                    self.workspace().remove_file(name)?;
                    index.mark_for_removal(name, head.blob_for(name))?;
                }
            }
        }

        let remotes = self.remotes().list()?;
        let target_spelling = target_name
            .remote_spelling(remotes.iter().map(String::as_str))
            .unwrap_or_else(|| target_name.to_string());
        let message = format!("Merged {target_spelling} into {}.", current_branch.name());
        let parentage = Parentage::Merge(current_branch.head().clone(), target_branch.head().clone());
        let merge_id = self.write_commit(parentage, index.changes(), &message)?;

        current_branch.advance_head(merge_id.clone());
        self.refs().write_branch(&current_branch)?;
        index.clear();
        index.write_updates()?;

        let merge_commit = self.database().parse_object_as_commit(&merge_id)?;
        self.remove_untracked_after_merge(&merge_commit)?;

        let conflicted = plan.has_conflicts();
        info!(merge = %merge_id, split = %split_point, conflicted, "merged branch");
        if conflicted {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(MergeOutcome::Merged { conflicted })
    }

    fn find_split_point(&self, current: &Branch, target: &Branch) -> anyhow::Result<ObjectId> {
        let database = self.database();
        let finder = SplitPointFinder::new(|commit_id: &ObjectId| {
            Ok(database
                .parse_object_as_commit(commit_id)?
                .parentage()
                .clone())
        });

        finder
            .find_split_point(current, target)?
            .ok_or_else(|| {
                RepositoryError::PreconditionFailed(format!(
                    "Branches {} and {} share no history.",
                    current.name(),
                    target.name()
                ))
                .into()
            })
    }

    fn plan_merge_actions(&self, plan: &MergePlan) -> anyhow::Result<Vec<(String, MergeAction)>> {
        let mut actions = Vec::new();

        for (name, resolution) in plan.resolutions() {
            debug!(file = %name, ?resolution, "resolved file");

            let action = match resolution {
                FileResolution::TakeTarget(blob_id) => {
                    let blob = self.database().parse_object_as_blob(blob_id)?;
                    MergeAction::Write {
                        content: blob.content().clone(),
                        blob,
                    }
                }
                FileResolution::Conflict { current, target } => {
                    let current = self.load_blob_content(current.as_ref())?;
                    let target = self.load_blob_content(target.as_ref())?;
                    let content = conflict_content(current.as_deref(), target.as_deref());
                    MergeAction::Write {
                        blob: Blob::new(content.clone()),
                        content,
                    }
                }
                FileResolution::Remove => MergeAction::Remove,
                FileResolution::KeepCurrent => continue,
            };
            actions.push((name.clone(), action));
        }

        Ok(actions)
    }

    fn load_blob_content(&self, blob_id: Option<&ObjectId>) -> anyhow::Result<Option<Bytes>> {
        blob_id
            .map(|blob_id| {
                self.database()
                    .parse_object_as_blob(blob_id)
                    .map(Blob::into_content)
            })
            .transpose()
    }

    // Every non-hidden working file the merge commit does not track goes.
    fn remove_untracked_after_merge(&self, merge_commit: &Commit) -> anyhow::Result<()> {
        for name in self.workspace().list_files()? {
            if !merge_commit.tracks(&name) {
                self.workspace().remove_file(&name)?;
            }
        }

        Ok(())
    }
}
