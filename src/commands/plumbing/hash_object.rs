use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::io::Write;

impl Repository {
    pub fn hash_object(&mut self, file: &str, write: bool) -> anyhow::Result<()> {
        let blob = self.workspace().parse_blob(file)?;

        // hash
        let object_id = blob.object_id()?;

        writeln!(self.writer(), "{}", object_id)?;

        // write (if write is true) as compressed object file
        if !write {
            return Ok(());
        }

        self.database().store(&blob)?;

        Ok(())
    }
}
