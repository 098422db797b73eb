//! Staging file entry
//!
//! Entries are stored with 8-byte alignment: a fixed
//! prefix followed by a NUL terminated name padded with zeros.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Maximum name length supported in staging entries
const MAX_NAME_SIZE: usize = 4095;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Kind byte, blob id and name length
pub const ENTRY_PREFIX_SIZE: usize = 1 + OBJECT_ID_LENGTH + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Addition,
    Removal,
}

impl EntryKind {
    fn as_byte(&self) -> u8 {
        match self {
            EntryKind::Addition => 0,
            EntryKind::Removal => 1,
        }
    }

    fn from_byte(byte: u8) -> anyhow::Result<Self> {
        match byte {
            0 => Ok(EntryKind::Addition),
            1 => Ok(EntryKind::Removal),
            _ => Err(anyhow!("Invalid staging entry kind: {byte}")),
        }
    }
}

/// One pending change of a staging file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StageEntry {
    pub kind: EntryKind,
    pub oid: ObjectId,
    pub name: String,
}

impl StageEntry {
    /// Full on-disk size of an entry whose name is `name_len` bytes long
    pub fn padded_size(name_len: usize) -> usize {
        let unpadded = ENTRY_PREFIX_SIZE + name_len + 1;
        unpadded.div_ceil(ENTRY_BLOCK) * ENTRY_BLOCK
    }

    /// Read the name length out of an entry prefix
    pub fn name_len(prefix: &[u8]) -> usize {
        byteorder::NetworkEndian::read_u16(&prefix[1 + OBJECT_ID_LENGTH..ENTRY_PREFIX_SIZE]) as usize
    }
}

impl Packable for StageEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let name = self.name.as_bytes();
        if name.len() > MAX_NAME_SIZE {
            return Err(anyhow!("File name too long: {}", self.name));
        }

        let mut bytes = Vec::with_capacity(Self::padded_size(name.len()));
        bytes.write_u8(self.kind.as_byte())?;
        bytes.write_all(self.oid.as_ref().as_bytes())?;
        bytes.write_u16::<byteorder::NetworkEndian>(name.len() as u16)?;
        bytes.write_all(name)?;
        bytes.push(0);

        while bytes.len() % ENTRY_BLOCK != 0 {
            bytes.push(0);
        }

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StageEntry {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let bytes = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        if bytes.len() < ENTRY_PREFIX_SIZE {
            return Err(anyhow!("Staging entry too short"));
        }

        let kind = EntryKind::from_byte(bytes[0])?;
        let oid = String::from_utf8(bytes[1..1 + OBJECT_ID_LENGTH].to_vec())?;
        let oid = ObjectId::try_parse(oid)?;

        let name_len = Self::name_len(&bytes);
        let name_end = ENTRY_PREFIX_SIZE + name_len;
        if bytes.len() < name_end {
            return Err(anyhow!("Staging entry name truncated"));
        }
        let name = String::from_utf8(bytes[ENTRY_PREFIX_SIZE..name_end].to_vec())?;

        Ok(StageEntry { kind, oid, name })
    }
}
