//! Per-file three-way resolution
//!
//! Every file name tracked at the split point, the current head or the target
//! head gets exactly one resolution. Conflicts are detected first and win over
//! the replacement rules.

use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet};

bitflags! {
    /// Which of the three snapshots track a file
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Presence: u8 {
        const SPLIT = 0b001;
        const CURRENT = 0b010;
        const TARGET = 0b100;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResolution {
    /// Write and stage the target's version
    TakeTarget(ObjectId),
    /// Stage for removal and delete the working copy
    Remove,
    /// Write and stage the conflict markers around both versions
    Conflict {
        current: Option<ObjectId>,
        target: Option<ObjectId>,
    },
    KeepCurrent,
}

impl FileResolution {
    /// Resolve one file from its blob in the split, current and target snapshots
    pub fn resolve(
        split: Option<&ObjectId>,
        current: Option<&ObjectId>,
        target: Option<&ObjectId>,
    ) -> Self {
        let mut presence = Presence::empty();
        presence.set(Presence::SPLIT, split.is_some());
        presence.set(Presence::CURRENT, current.is_some());
        presence.set(Presence::TARGET, target.is_some());

        let conflict = match presence {
            p if p == Presence::all() => split != current && split != target && current != target,
            p if p == Presence::SPLIT | Presence::CURRENT => split != current,
            p if p == Presence::SPLIT | Presence::TARGET => split != target,
            p if p == Presence::CURRENT | Presence::TARGET => current != target,
            _ => false,
        };
        if conflict {
            return FileResolution::Conflict {
                current: current.cloned(),
                target: target.cloned(),
            };
        }

        match (split, current, target) {
            (Some(s), Some(c), Some(t)) if s == c && s != t => FileResolution::TakeTarget(t.clone()),
            (Some(s), Some(c), None) if s == c => FileResolution::Remove,
            (None, None, Some(t)) => FileResolution::TakeTarget(t.clone()),
            _ => FileResolution::KeepCurrent,
        }
    }
}

/// Resolutions of every file that needs an action, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    resolutions: BTreeMap<String, FileResolution>,
}

impl MergePlan {
    pub fn build(split: &TrackedFiles, current: &TrackedFiles, target: &TrackedFiles) -> Self {
        let names = split
            .keys()
            .chain(current.keys())
            .chain(target.keys())
            .collect::<BTreeSet<_>>();

        let resolutions = names
            .into_iter()
            .filter_map(|name| {
                let resolution =
                    FileResolution::resolve(split.get(name), current.get(name), target.get(name));
                (resolution != FileResolution::KeepCurrent).then(|| (name.clone(), resolution))
            })
            .collect();

        MergePlan { resolutions }
    }

    pub fn resolutions(&self) -> impl Iterator<Item = (&String, &FileResolution)> {
        self.resolutions.iter()
    }

    pub fn has_conflicts(&self) -> bool {
        self.resolutions
            .values()
            .any(|resolution| matches!(resolution, FileResolution::Conflict { .. }))
    }
}
