//! Object store
//!
//! Blobs and commits live in one flat keyspace under `.twig/objects/<id>`.
//! Every object is written as `<type> <size>\0<body>`, zlib-compressed, first
//! to a temporary file that is then renamed into place.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Persist an object unless an object with the same id is already stored
    ///
    /// # Returns
    ///
    /// The id of the stored object
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            let body = object.serialize()?;
            let mut content = format!("{} {}\0", object.object_type(), body.len()).into_bytes();
            content.extend_from_slice(&body);

            self.write_object(object_path, Self::compress(content.into())?)?;
            debug!(object = %object_id, kind = %object.object_type(), "stored object");
        }

        Ok(object_id)
    }

    /// Load the compressed bytes of an object exactly as they are stored
    pub fn load_raw(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.is_file() {
            return Err(RepositoryError::not_found("object", object_id.as_ref()).into());
        }

        let content = std::fs::read(&object_path).with_context(|| {
            format!("Unable to read object file {}", object_path.display())
        })?;

        Ok(content.into())
    }

    /// Store compressed bytes copied from another object store
    pub fn store_raw(&self, object_id: &ObjectId, content: Bytes) -> anyhow::Result<()> {
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            self.write_object(object_path, content)?;
            debug!(object = %object_id, "copied object");
        }

        Ok(())
    }

    /// Load the body of an object, its header stripped
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let (_, mut object_reader) = self.parse_object_as_bytes(object_id)?;
        let mut body = Vec::new();
        object_reader.read_to_end(&mut body)?;

        Ok(body.into())
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            _ => Err(RepositoryError::not_found("blob", object_id.as_ref()).into()),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            _ => Err(RepositoryError::not_found("commit", object_id.as_ref()).into()),
        }
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = Self::decompress(self.load_raw(object_id)?)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // the object only becomes visible once it is complete
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// List the ids of every stored object of the given type
    pub fn list_objects(&self, object_type: ObjectType) -> anyhow::Result<Vec<ObjectId>> {
        if !self.path.is_dir() {
            return Ok(Vec::new());
        }

        let mut object_ids = std::fs::read_dir(&self.path)
            .with_context(|| format!("Unable to list objects in {}", self.path.display()))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| ObjectId::try_parse(entry.file_name().to_string_lossy().into()).ok())
            .filter(|object_id| object_id.object_type() == object_type)
            .collect::<Vec<_>>();
        object_ids.sort();

        Ok(object_ids)
    }

    /// Find all commits whose id starts with the given prefix
    pub fn find_commits_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self
            .list_objects(ObjectType::Commit)?
            .into_iter()
            .filter(|object_id| object_id.as_ref().starts_with(prefix))
            .collect())
    }

    /// Resolve a full or abbreviated commit id
    ///
    /// # Returns
    ///
    /// The unique matching commit id, `NotFound` when nothing matches and
    /// `AmbiguousId` when several commits share the prefix
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let mut candidates = self.find_commits_by_prefix(prefix)?;

        match candidates.len() {
            0 => Err(RepositoryError::not_found("commit", prefix).into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(RepositoryError::AmbiguousId {
                prefix: prefix.to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }
            .into()),
        }
    }
}
