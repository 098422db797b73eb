//! Branch pointer and history
//!
//! A branch records its head commit and the ordered list of commits it has
//! pointed to. The list is what the merge split-point search walks.
//!
//! ## File Format
//!
//! ```text
//! head <commit id>
//! history <commit id>
//! history <commit id>
//! ...
//! ```

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    name: BranchName,
    head: ObjectId,
    history: Vec<ObjectId>,
}

impl Branch {
    /// A branch whose history starts at `head`
    pub fn new(name: BranchName, head: ObjectId) -> Self {
        Branch {
            name,
            history: vec![head.clone()],
            head,
        }
    }

    /// A new branch starting where `source` currently is
    pub fn fork(name: BranchName, source: &Branch) -> Self {
        Branch {
            name,
            head: source.head.clone(),
            history: source.history.clone(),
        }
    }

    /// The same pointer and history under another name
    pub fn renamed(&self, name: BranchName) -> Self {
        Branch {
            name,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn head(&self) -> &ObjectId {
        &self.head
    }

    pub fn history(&self) -> &[ObjectId] {
        &self.history
    }

    pub fn position(&self, commit_id: &ObjectId) -> Option<usize> {
        self.history.iter().position(|id| id == commit_id)
    }

    pub fn contains(&self, commit_id: &ObjectId) -> bool {
        self.position(commit_id).is_some()
    }

    /// Move the head to a new commit and record it
    pub fn advance_head(&mut self, commit_id: ObjectId) {
        self.history.push(commit_id.clone());
        self.head = commit_id;
    }

    /// Rewind to a commit already in the history, or advance to a new one
    pub fn reset(&mut self, commit_id: ObjectId) {
        match self.position(&commit_id) {
            Some(index) => {
                self.history.truncate(index + 1);
                self.head = commit_id;
            }
            None => self.advance_head(commit_id),
        }
    }

    /// Catch up with `target`, whose history extends this branch's head
    pub fn fast_forward(&mut self, target: &Branch) {
        match target.position(&self.head) {
            Some(index) => self
                .history
                .extend(target.history[index + 1..].iter().cloned()),
            None => self.history = target.history.clone(),
        }
        self.head = target.head.clone();
    }

    /// Adopt the commits of `local` that follow this branch's head
    ///
    /// # Returns
    ///
    /// `false` when this head is not part of `local`'s history
    pub fn append_after_head(&mut self, local: &Branch) -> bool {
        match local.position(&self.head) {
            Some(index) => {
                for commit_id in &local.history[index + 1..] {
                    self.advance_head(commit_id.clone());
                }
                true
            }
            None => false,
        }
    }

    pub fn serialize(&self) -> String {
        let mut lines = vec![format!("head {}", self.head)];
        lines.extend(self.history.iter().map(|id| format!("history {id}")));
        lines.push(String::new());

        lines.join("\n")
    }

    pub fn deserialize(name: BranchName, content: &str) -> anyhow::Result<Self> {
        let mut head = None;
        let mut history = Vec::new();

        for line in content.lines().filter(|line| !line.is_empty()) {
            match line.split_once(' ') {
                Some(("head", id)) => head = Some(ObjectId::try_parse(id.to_string())?),
                Some(("history", id)) => history.push(ObjectId::try_parse(id.to_string())?),
                _ => return Err(anyhow!("Invalid branch file line for {name}: {line}")),
            }
        }

        let head = head.ok_or_else(|| anyhow!("Branch {name} has no head"))?;
        Ok(Branch {
            name,
            head,
            history,
        })
    }
}
