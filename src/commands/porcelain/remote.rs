use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::remotes::RemoteDescriptor;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::remote::RemoteEndpoint;
use crate::commands::porcelain::merge::MergeOutcome;
use crate::errors::RepositoryError;
use std::collections::HashSet;
use tracing::{debug, info};

impl Repository {
    pub fn add_remote(&mut self, name: &str, location: &str) -> anyhow::Result<()> {
        let descriptor = RemoteDescriptor::resolve(name, location, self.path());

        self.remotes().add(&descriptor)
    }

    pub fn rm_remote(&mut self, name: &str) -> anyhow::Result<()> {
        self.remotes().remove(name)
    }

    /// Append the current branch's commits to `branch` at `remote`
    ///
    /// The remote branch must not have moved past anything in the local
    /// history. The remote working tree is replaced by the pushed snapshot.
    pub async fn push(&mut self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let endpoint = self.remotes().open(remote)?;
        let branch_name = BranchName::try_parse(branch.to_string())?;
        let local = self.current_branch()?;

        let remote_branch = match endpoint.fetch_branch(&branch_name)? {
            Some(mut remote_branch) => {
                if !remote_branch.append_after_head(&local) {
                    return Err(RepositoryError::PreconditionFailed(
                        "Please pull down remote changes before pushing.".into(),
                    )
                    .into());
                }
                remote_branch
            }
            None => Branch::fork(branch_name, &local),
        };

        let copied = self.push_objects(endpoint.as_ref(), local.head())?;
        endpoint.write_branch(&remote_branch)?;

        let head = self.head_commit()?;
        let files = head
            .files()
            .iter()
            .map(|(name, blob_id)| {
                let blob = self.database().parse_object_as_blob(blob_id)?;
                Ok((name.clone(), blob.into_content()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        endpoint.replace_work_tree(&files)?;

        info!(remote, branch = %remote_branch.name(), head = %remote_branch.head(), copied, "pushed branch");

        Ok(())
    }

    /// Copy `branch` of `remote` into the local branch `<remote>-<branch>`
    pub async fn fetch(&mut self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let endpoint = self.remotes().open(remote)?;
        let branch_name = BranchName::try_parse(branch.to_string())?;

        let Some(remote_branch) = endpoint.fetch_branch(&branch_name)? else {
            debug!(remote, available = ?endpoint.list_branches()?, "remote branch missing");
            return Err(RepositoryError::PreconditionFailed(
                "That remote does not have that branch.".into(),
            )
            .into());
        };

        let mut copied = 0;
        for commit_id in remote_branch.history().iter().chain([remote_branch.head()]) {
            copied += self.fetch_objects(endpoint.as_ref(), commit_id)?;
        }

        let local_name = BranchName::fetched(remote, branch)?;
        let fetched = remote_branch.renamed(local_name.clone());
        self.refs().write_branch(&fetched)?;

        let staged = endpoint.fetch_stage(&branch_name)?;
        for blob_id in staged.additions.values().chain(staged.removals.values()) {
            if !self.database().contains(blob_id) && endpoint.has_object(blob_id) {
                self.database()
                    .store_raw(blob_id, endpoint.fetch_object(blob_id)?)?;
            }
        }
        let mut stage = Index::new(self.stage_path(&local_name));
        stage.replace(staged);
        stage.write_updates()?;

        info!(remote, branch = %local_name, head = %fetched.head(), copied, "fetched branch");

        Ok(())
    }

    /// Fetch `branch` of `remote`, then merge it into the current branch
    pub async fn pull(&mut self, remote: &str, branch: &str) -> anyhow::Result<MergeOutcome> {
        self.fetch(remote, branch).await?;

        self.merge(&format!("{remote}/{branch}")).await
    }

    // Copies every commit and blob reachable from `head` that the remote lacks.
    fn push_objects(&self, endpoint: &dyn RemoteEndpoint, head: &ObjectId) -> anyhow::Result<usize> {
        let database = self.database();
        let mut copied = 0;

        for object_id in reachable_objects(database, head)? {
            if !endpoint.has_object(&object_id) {
                endpoint.store_object(&object_id, database.load_raw(&object_id)?)?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    // Commits are copied before they are parsed, so the walk reads local copies.
    fn fetch_objects(&self, endpoint: &dyn RemoteEndpoint, head: &ObjectId) -> anyhow::Result<usize> {
        let database = self.database();
        let mut copied = 0;
        let mut pending = vec![head.clone()];
        let mut seen = HashSet::new();

        while let Some(commit_id) = pending.pop() {
            if !seen.insert(commit_id.clone()) {
                continue;
            }

            if !database.contains(&commit_id) {
                database.store_raw(&commit_id, endpoint.fetch_object(&commit_id)?)?;
                copied += 1;
            }

            let commit = database.parse_object_as_commit(&commit_id)?;
            for blob_id in commit.files().values() {
                if !database.contains(blob_id) {
                    database.store_raw(blob_id, endpoint.fetch_object(blob_id)?)?;
                    copied += 1;
                }
            }
            pending.extend(commit.parentage().ids().into_iter().cloned());
        }

        Ok(copied)
    }
}

/// Ids of every commit reachable from `head` and of every blob they track
fn reachable_objects(database: &Database, head: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut objects = Vec::new();
    let mut pending = vec![head.clone()];
    let mut seen = HashSet::new();

    while let Some(commit_id) = pending.pop() {
        if !seen.insert(commit_id.clone()) {
            continue;
        }

        let commit = database.parse_object_as_commit(&commit_id)?;
        for blob_id in commit.files().values() {
            if seen.insert(blob_id.clone()) {
                objects.push(blob_id.clone());
            }
        }
        pending.extend(commit.parentage().ids().into_iter().cloned());
        objects.push(commit_id);
    }

    Ok(objects)
}
