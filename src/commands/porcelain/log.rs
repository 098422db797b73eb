use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// First-parent history of the current branch, newest first
    pub fn log(&self) -> anyhow::Result<()> {
        let branch = self.current_branch()?;
        let rev_list = RevList::new(self.database(), branch.head().clone());

        for entry in &rev_list {
            let (commit_id, commit) = entry?;
            self.show_commit(&commit_id, &commit)?;
        }

        Ok(())
    }

    /// Every commit ever made, in id order
    pub fn global_log(&self) -> anyhow::Result<()> {
        for commit_id in self.database().list_objects(ObjectType::Commit)? {
            let commit = self.database().parse_object_as_commit(&commit_id)?;
            self.show_commit(&commit_id, &commit)?;
        }

        Ok(())
    }

    /// Ids of every commit whose message equals `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut found = false;

        for commit_id in self.database().list_objects(ObjectType::Commit)? {
            let commit = self.database().parse_object_as_commit(&commit_id)?;
            if commit.message() == message {
                writeln!(self.writer(), "{commit_id}")?;
                found = true;
            }
        }

        if !found {
            return Err(RepositoryError::not_found("commit", message).into());
        }

        Ok(())
    }

    fn show_commit(&self, commit_id: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "===")?;
        writeln!(self.writer(), "commit {commit_id}")?;
        if let Some(second) = commit.parentage().second()
            && let Some(first) = commit.parentage().first()
        {
            writeln!(
                self.writer(),
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(self.writer(), "Date: {}", commit.readable_timestamp())?;
        writeln!(self.writer(), "{}", commit.message())?;
        writeln!(self.writer())?;

        Ok(())
    }
}
