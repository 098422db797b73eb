//! Split point finder for merges
//!
//! Branches keep their own linear history list rather than a graph index, so
//! the split point is approximated over those lists instead of computed as a
//! true lowest common ancestor.
//!
//! ## Algorithm Overview
//!
//! 1. Every commit present in both history lists is a candidate, scored by
//!    `min(len_current - index_current, len_target - index_target)`, the
//!    remaining distance to the tip on the closer side.
//! 2. Every merge commit in one side's history whose second parent appears in
//!    the other side's history makes that second parent a candidate, scored by
//!    `min(len_x - index_x(merge), len_y - 1 - index_y(second parent))`.
//! 3. A candidate reached several ways keeps its smallest score. The smallest
//!    score wins; ties go to the lexicographically smallest commit id.
//!
//! ## Debug Logging
//!
//! Candidate scores are logged at `debug` level. With the `debug_merge` feature
//! flag (`cargo build --features debug_merge`) they are raised to `info`.

use crate::artifacts::branch::branch::Branch;
use crate::artifacts::objects::commit::Parentage;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            tracing::info!($($arg)*);
        }
        #[cfg(not(feature = "debug_merge"))]
        {
            tracing::debug!($($arg)*);
        }
    };
}

/// Finds the split point of two branches
///
/// # Type Parameters
///
/// * `ParentageLoaderFn` - Loads the parentage of a commit, so the finder can
///   tell merge commits apart without depending on a storage backend
pub struct SplitPointFinder<ParentageLoaderFn>
where
    ParentageLoaderFn: Fn(&ObjectId) -> anyhow::Result<Parentage>,
{
    parentage_loader: ParentageLoaderFn,
}

impl<ParentageLoaderFn> SplitPointFinder<ParentageLoaderFn>
where
    ParentageLoaderFn: Fn(&ObjectId) -> anyhow::Result<Parentage>,
{
    pub fn new(parentage_loader: ParentageLoaderFn) -> Self {
        Self { parentage_loader }
    }

    /// Finds the split point between the current and the target branch
    ///
    /// # Returns
    ///
    /// `None` only when the histories share nothing, which cannot happen for
    /// branches descending from the same root commit
    pub fn find_split_point(
        &self,
        current: &Branch,
        target: &Branch,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut candidates = BTreeMap::new();

        let current_len = current.history().len();
        let target_len = target.history().len();
        for (current_index, commit_id) in current.history().iter().enumerate() {
            if let Some(target_index) = target.position(commit_id) {
                let score = (current_len - current_index).min(target_len - target_index);
                Self::record(&mut candidates, commit_id, score);
            }
        }

        self.record_merged_parents(&mut candidates, current, target)?;
        self.record_merged_parents(&mut candidates, target, current)?;

        let scores = candidates
            .iter()
            .map(|(id, score)| format!("{}:{score}", id.to_short_oid()))
            .collect::<Vec<_>>();
        debug_log!(
            current = %current.name(),
            target = %target.name(),
            candidates = ?scores,
            "scored split point candidates"
        );

        // BTreeMap iterates ids in order, so min_by_key keeps the smallest id on ties
        let split_point = candidates
            .into_iter()
            .min_by_key(|(_, score)| *score)
            .map(|(commit_id, _)| commit_id);

        if let Some(split_point) = &split_point {
            debug_log!(split_point = %split_point, "found split point");
        }

        Ok(split_point)
    }

    fn record_merged_parents(
        &self,
        candidates: &mut BTreeMap<ObjectId, usize>,
        side: &Branch,
        other: &Branch,
    ) -> anyhow::Result<()> {
        let side_len = side.history().len();
        let other_len = other.history().len();

        for (side_index, commit_id) in side.history().iter().enumerate() {
            let parentage = (self.parentage_loader)(commit_id)?;

            if let Some(second_parent) = parentage.second()
                && let Some(other_index) = other.position(second_parent)
            {
                let score = (side_len - side_index).min(other_len - 1 - other_index);
                Self::record(candidates, second_parent, score);
            }
        }

        Ok(())
    }

    fn record(candidates: &mut BTreeMap<ObjectId, usize>, commit_id: &ObjectId, score: usize) {
        candidates
            .entry(commit_id.clone())
            .and_modify(|existing| *existing = (*existing).min(score))
            .or_insert(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    /// In-memory parentage store for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, Parentage>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: &ObjectId, parents: &[&ObjectId]) {
            let parentage = match parents {
                [] => Parentage::Root,
                [parent] => Parentage::Single((*parent).clone()),
                [first, second] => Parentage::Merge((*first).clone(), (*second).clone()),
                _ => panic!("at most two parents"),
            };
            self.commits.insert(commit_id.clone(), parentage);
        }

        fn parentage(&self, commit_id: &ObjectId) -> anyhow::Result<Parentage> {
            self.commits
                .get(commit_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Commit not found in test store"))
        }
    }

    fn create_oid(id: &str) -> ObjectId {
        let mut hex_string = id
            .as_bytes()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>();
        while hex_string.len() < 40 {
            hex_string.push('0');
        }
        hex_string.truncate(40);

        ObjectId::try_parse(format!("c{hex_string}")).expect("Invalid test ObjectId")
    }

    fn branch(name: &str, history: &[&ObjectId]) -> Branch {
        let mut branch = Branch::new(
            BranchName::try_parse(name.to_string()).unwrap(),
            history[0].clone(),
        );
        for commit_id in &history[1..] {
            branch.advance_head((*commit_id).clone());
        }
        branch
    }

    fn find(store: &InMemoryCommitStore, current: &Branch, target: &Branch) -> Option<ObjectId> {
        SplitPointFinder::new(|commit_id| store.parentage(commit_id))
            .find_split_point(current, target)
            .unwrap()
    }

    #[fixture]
    fn diverged() -> (InMemoryCommitStore, Branch, Branch) {
        let mut store = InMemoryCommitStore::default();

        // R <- A <- B (master)
        //       \
        //        C <- D (feature)
        let r = create_oid("root");
        let a = create_oid("a");
        let b = create_oid("b");
        let c = create_oid("c");
        let d = create_oid("d");
        store.add_commit(&r, &[]);
        store.add_commit(&a, &[&r]);
        store.add_commit(&b, &[&a]);
        store.add_commit(&c, &[&a]);
        store.add_commit(&d, &[&c]);

        let master = branch("master", &[&r, &a, &b]);
        let feature = branch("feature", &[&r, &a, &c, &d]);
        (store, master, feature)
    }

    #[rstest]
    fn diverged_branches_split_at_the_last_shared_commit(
        diverged: (InMemoryCommitStore, Branch, Branch),
    ) {
        let (store, master, feature) = diverged;

        assert_eq!(find(&store, &master, &feature), Some(create_oid("a")));
        assert_eq!(find(&store, &feature, &master), Some(create_oid("a")));
    }

    #[rstest]
    fn ancestor_branch_splits_at_its_own_head(diverged: (InMemoryCommitStore, Branch, Branch)) {
        let (store, _, feature) = diverged;
        let behind = branch("behind", &[&create_oid("root"), &create_oid("a")]);

        assert_eq!(find(&store, &behind, &feature), Some(behind.head().clone()));
        assert_eq!(find(&store, &feature, &behind), Some(behind.head().clone()));
    }

    #[test]
    fn merged_in_second_parent_becomes_a_candidate() {
        let mut store = InMemoryCommitStore::default();

        // R <- A <------ M (master, merges B)
        //  \            /
        //   B ---------+ <- C (feature)
        let r = create_oid("root");
        let a = create_oid("a");
        let b = create_oid("b");
        let m = create_oid("m");
        let c = create_oid("c");
        store.add_commit(&r, &[]);
        store.add_commit(&a, &[&r]);
        store.add_commit(&b, &[&r]);
        store.add_commit(&m, &[&a, &b]);
        store.add_commit(&c, &[&b]);

        let master = branch("master", &[&r, &a, &m]);
        let feature = branch("feature", &[&r, &b, &c]);

        // root scores min(3, 3) = 3, b scores min(3 - 2, 3 - 1 - 1) = 1
        assert_eq!(find(&store, &master, &feature), Some(b.clone()));
        assert_eq!(find(&store, &feature, &master), Some(b));
    }

    #[test]
    fn equal_scores_break_to_the_smallest_id() {
        let mut store = InMemoryCommitStore::default();
        let r = create_oid("root");
        let x = create_oid("x");
        let y = create_oid("y");
        store.add_commit(&r, &[]);
        store.add_commit(&x, &[&r]);
        store.add_commit(&y, &[&r]);

        // both shared commits sit one step away from a tip
        let current = branch("current", &[&r, &x, &y]);
        let target = branch("target", &[&r, &y, &x]);

        let expected = std::cmp::min(x.clone(), y.clone());
        assert_eq!(find(&store, &current, &target), Some(expected.clone()));
        assert_eq!(find(&store, &target, &current), Some(expected));
    }

    #[test]
    fn unrelated_histories_have_no_split_point() {
        let mut store = InMemoryCommitStore::default();
        let a = create_oid("a");
        let b = create_oid("b");
        store.add_commit(&a, &[]);
        store.add_commit(&b, &[]);

        assert_eq!(find(&store, &branch("one", &[&a]), &branch("two", &[&b])), None);
    }
}
