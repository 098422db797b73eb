use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{Status, StatusInfo};
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head = self.head_commit()?;
        let status_info =
            Status::new(self.workspace(), head.files(), index.changes()).initialize()?;

        self.print_branches()?;
        self.print_status(&status_info)?;

        Ok(())
    }

    fn print_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().current_branch_name()?;

        writeln!(self.writer(), "=== Branches ===")?;
        for name in self.refs().list_branches()? {
            if name == current {
                writeln!(self.writer(), "{}", format!("*{name}").green())?;
            } else {
                writeln!(self.writer(), "{name}")?;
            }
        }
        writeln!(self.writer())?;

        Ok(())
    }

    fn print_status(&self, status_info: &StatusInfo) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== Staged Files ===")?;
        for name in &status_info.staged_files {
            writeln!(self.writer(), "{name}")?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Removed Files ===")?;
        for name in &status_info.removed_files {
            writeln!(self.writer(), "{name}")?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Modifications Not Staged For Commit ===")?;
        for (name, change) in &status_info.workspace_changeset {
            writeln!(self.writer(), "{name} {change}")?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Untracked Files ===")?;
        for name in &status_info.untracked_files {
            writeln!(self.writer(), "{name}")?;
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
