//! Untracked-file safety check
//!
//! Before the working tree is rewritten, every file about to be written is
//! compared with what is on disk. A file the current head does not track
//! whose content differs from the incoming one would be lost, so the whole
//! operation is refused.

use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::TrackedFiles;
use crate::errors::RepositoryError;
use std::path::PathBuf;
use tracing::warn;

/// Untracked working files that the given writes would overwrite
pub fn untracked_overwrites<'w>(
    workspace: &Workspace,
    head: &TrackedFiles,
    writes: impl IntoIterator<Item = (&'w str, &'w [u8])>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut in_the_way = Vec::new();

    for (name, incoming) in writes {
        if head.contains_key(name) {
            continue;
        }

        if let Some(existing) = workspace.try_read_file(name)?
            && existing.as_ref() != incoming
        {
            in_the_way.push(PathBuf::from(name));
        }
    }

    Ok(in_the_way)
}

/// Refuse to go on when an untracked file is in the way
pub fn ensure_no_untracked_overwrites<'w>(
    workspace: &Workspace,
    head: &TrackedFiles,
    writes: impl IntoIterator<Item = (&'w str, &'w [u8])>,
) -> anyhow::Result<()> {
    let in_the_way = untracked_overwrites(workspace, head, writes)?;

    if in_the_way.is_empty() {
        Ok(())
    } else {
        warn!(files = ?in_the_way, "untracked files in the way");
        Err(RepositoryError::UntrackedFileConflict(in_the_way).into())
    }
}
