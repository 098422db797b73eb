//! Pending additions and removals of one branch
//!
//! Every decision is made against the blob the current head records for the
//! file, so staging content identical to the head is never a change.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::BTreeMap;

/// What staging a file did to the pending changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Added,
    Replaced,
    Unstaged,
    Unchanged,
}

/// What marking a file for removal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Only a staged addition was dropped; the working copy stays
    Unstaged,
    /// The head tracks the file; the removal is recorded and the working copy must go
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedChanges {
    pub additions: BTreeMap<String, ObjectId>,
    pub removals: BTreeMap<String, ObjectId>,
}

impl StagedChanges {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
    }

    pub fn is_staged(&self, name: &str) -> bool {
        self.additions.contains_key(name)
    }

    pub fn is_removed(&self, name: &str) -> bool {
        self.removals.contains_key(name)
    }

    /// Stage `blob` as the new content of `name`
    ///
    /// `head_blob` is the blob the current head tracks for `name`, if any.
    /// Staging always cancels a pending removal of the same file.
    pub fn stage(&mut self, name: &str, blob: ObjectId, head_blob: Option<&ObjectId>) -> StageOutcome {
        self.removals.remove(name);

        if head_blob == Some(&blob) {
            return match self.additions.remove(name) {
                Some(_) => StageOutcome::Unstaged,
                None => StageOutcome::Unchanged,
            };
        }

        match self.additions.insert(name.to_string(), blob.clone()) {
            Some(previous) if previous == blob => StageOutcome::Unchanged,
            Some(_) => StageOutcome::Replaced,
            None => StageOutcome::Added,
        }
    }

    /// Record that `name` should leave the next snapshot
    pub fn mark_for_removal(
        &mut self,
        name: &str,
        head_blob: Option<&ObjectId>,
    ) -> Result<RemovalOutcome, RepositoryError> {
        let was_staged = self.additions.remove(name).is_some();

        match head_blob {
            Some(blob) => {
                self.removals.insert(name.to_string(), blob.clone());
                Ok(RemovalOutcome::Removed)
            }
            None if was_staged => Ok(RemovalOutcome::Unstaged),
            None => Err(RepositoryError::NothingToRemove(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn blob(seed: char) -> ObjectId {
        Blob::from(seed.to_string().as_str()).object_id().unwrap()
    }

    #[rstest]
    #[case::new_file(None, None, 'a', StageOutcome::Added)]
    #[case::differs_from_head(Some('h'), None, 'a', StageOutcome::Added)]
    #[case::replaces_staged(Some('h'), Some('s'), 'a', StageOutcome::Replaced)]
    #[case::reverted_to_head(Some('h'), Some('s'), 'h', StageOutcome::Unstaged)]
    #[case::same_as_head(Some('h'), None, 'h', StageOutcome::Unchanged)]
    #[case::same_as_staged(None, Some('s'), 's', StageOutcome::Unchanged)]
    fn staging_decisions(
        #[case] head: Option<char>,
        #[case] staged: Option<char>,
        #[case] new: char,
        #[case] expected: StageOutcome,
    ) {
        let mut changes = StagedChanges::default();
        if let Some(staged) = staged {
            changes.additions.insert("f.txt".into(), blob(staged));
        }
        let head = head.map(blob);

        let outcome = changes.stage("f.txt", blob(new), head.as_ref());

        assert_eq!(outcome, expected);
        let should_be_staged = head.as_ref() != Some(&blob(new));
        assert_eq!(changes.is_staged("f.txt"), should_be_staged);
    }

    #[test]
    fn staging_head_content_cancels_a_removal() {
        let mut changes = StagedChanges::default();
        changes.removals.insert("f.txt".into(), blob('h'));

        changes.stage("f.txt", blob('h'), Some(&blob('h')));

        assert!(changes.is_empty());
    }

    #[test]
    fn removing_a_tracked_file_records_it() {
        let mut changes = StagedChanges::default();
        changes.additions.insert("f.txt".into(), blob('s'));

        let outcome = changes.mark_for_removal("f.txt", Some(&blob('h'))).unwrap();

        assert_eq!(outcome, RemovalOutcome::Removed);
        assert!(!changes.is_staged("f.txt"));
        assert_eq!(changes.removals.get("f.txt"), Some(&blob('h')));
    }

    #[test]
    fn removing_a_staged_only_file_just_unstages() {
        let mut changes = StagedChanges::default();
        changes.additions.insert("f.txt".into(), blob('s'));

        let outcome = changes.mark_for_removal("f.txt", None).unwrap();

        assert_eq!(outcome, RemovalOutcome::Unstaged);
        assert!(changes.is_empty());
    }

    #[test]
    fn removing_an_unknown_file_fails() {
        let mut changes = StagedChanges::default();

        let err = changes.mark_for_removal("ghost.txt", None).unwrap_err();

        assert_eq!(err, RepositoryError::NothingToRemove("ghost.txt".into()));
    }
}
