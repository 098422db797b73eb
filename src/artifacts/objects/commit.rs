//! Commit object
//!
//! Commits are immutable snapshots of the complete tracked file set. They
//! contain:
//! - Parent linkage: none for the root, one for a normal commit, two for a merge
//! - A timestamp
//! - The tracked-file map (file name to blob id), never a diff
//! - The commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-id>
//! timestamp <unix-seconds> <timezone>
//! file <blob-id> <name>
//!
//! <commit message>
//! ```
//!
//! The id is `c` + SHA-1 of everything after the header, so it covers the final
//! tracked-file map and not only the message, timestamp and parents.

use crate::artifacts::index::StagedChanges;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Message recorded by the root commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable overriding the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "TWIG_COMMIT_DATE";

/// Tracked-file map of a commit
pub type TrackedFiles = BTreeMap<String, ObjectId>;

/// How a commit links into the history graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parentage {
    Root,
    Single(ObjectId),
    Merge(ObjectId, ObjectId),
}

impl Parentage {
    /// The parent followed by first-parent history
    pub fn first(&self) -> Option<&ObjectId> {
        match self {
            Parentage::Root => None,
            Parentage::Single(parent) | Parentage::Merge(parent, _) => Some(parent),
        }
    }

    /// The merged-in parent of a merge commit
    pub fn second(&self) -> Option<&ObjectId> {
        match self {
            Parentage::Merge(_, parent) => Some(parent),
            _ => None,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, Parentage::Merge(..))
    }

    pub fn ids(&self) -> Vec<&ObjectId> {
        self.first().into_iter().chain(self.second()).collect()
    }

    fn from_ids(mut parents: Vec<ObjectId>) -> anyhow::Result<Self> {
        match parents.len() {
            0 => Ok(Parentage::Root),
            1 => Ok(Parentage::Single(parents.remove(0))),
            2 => {
                let second = parents.remove(1);
                Ok(Parentage::Merge(parents.remove(0), second))
            }
            count => Err(anyhow::anyhow!(
                "Invalid commit object: {count} parents recorded"
            )),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parentage: Parentage,
    timestamp: DateTime<FixedOffset>,
    files: TrackedFiles,
    message: String,
}

impl Commit {
    pub fn new(
        parentage: Parentage,
        timestamp: DateTime<FixedOffset>,
        files: TrackedFiles,
        message: String,
    ) -> Self {
        Commit {
            parentage,
            timestamp,
            files,
            message,
        }
    }

    /// The commit every repository starts from: epoch timestamp, no files
    pub fn root() -> Self {
        let epoch = DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset();
        Commit::new(
            Parentage::Root,
            epoch,
            TrackedFiles::new(),
            ROOT_COMMIT_MESSAGE.to_string(),
        )
    }

    /// Snapshot staged changes on top of a base file map
    ///
    /// The base map is copied, staged additions are applied, then staged
    /// removals, so a name present in both staged maps ends up removed.
    pub fn snapshot(
        parentage: Parentage,
        base: &TrackedFiles,
        staged: &StagedChanges,
        timestamp: DateTime<FixedOffset>,
        message: String,
    ) -> Self {
        let mut files = base.clone();
        files.extend(
            staged
                .additions
                .iter()
                .map(|(name, oid)| (name.clone(), oid.clone())),
        );
        for name in staged.removals.keys() {
            files.remove(name);
        }

        Commit::new(parentage, timestamp, files, message)
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parentage(&self) -> &Parentage {
        &self.parentage
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parentage.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parentage.is_merge()
    }

    pub fn files(&self) -> &TrackedFiles {
        &self.files
    }

    pub fn blob_for(&self, name: &str) -> Option<&ObjectId> {
        self.files.get(name)
    }

    pub fn tracks(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Timestamp for a new commit
    ///
    /// Reads `TWIG_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
    /// back to the current local time when it is unset or unparsable.
    pub fn timestamp_from_env() -> DateTime<FixedOffset> {
        std::env::var(COMMIT_DATE_ENV)
            .ok()
            .and_then(|date_str| {
                DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    fn body_lines(&self) -> Vec<String> {
        let mut lines = vec![];

        for parent in self.parentage.ids() {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (name, oid) in &self.files {
            lines.push(format!("file {} {}", oid.as_ref(), name));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines
    }
}

fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    let (seconds, timezone) = value
        .split_once(' ')
        .context("Invalid commit object: malformed timestamp")?;
    let seconds = seconds
        .parse::<i64>()
        .context("Invalid commit object: timestamp is not a number")?;

    let sign = match timezone.as_bytes().first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => anyhow::bail!("Invalid commit object: malformed timezone {timezone}"),
    };
    let hours = timezone
        .get(1..3)
        .and_then(|h| h.parse::<i32>().ok())
        .context("Invalid commit object: malformed timezone hours")?;
    let minutes = timezone
        .get(3..5)
        .and_then(|m| m.parse::<i32>().ok())
        .context("Invalid commit object: malformed timezone minutes")?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .context("Invalid commit object: timezone out of range")?;

    Ok(DateTime::from_timestamp(seconds, 0)
        .context("Invalid commit object: timestamp out of range")?
        .with_timezone(&offset))
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let object_content = self.body_lines().join("\n");

        let mut content_bytes = Vec::new();
        content_bytes.write_all(object_content.as_bytes())?;

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.split('\n');

        // Parse all parent lines (there can be 0, 1 or 2 parents)
        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing timestamp line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing timestamp line")?;
        }

        let timestamp = next_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?;
        let timestamp = parse_timestamp(timestamp)?;

        let mut files = TrackedFiles::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let entry = line
                .strip_prefix("file ")
                .context("Invalid commit object: invalid file line")?;
            let (oid, name) = entry
                .split_once(' ')
                .context("Invalid commit object: file line without a name")?;
            files.insert(name.to_string(), ObjectId::try_parse(oid.to_string())?);
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(
            Parentage::from_ids(parents)?,
            timestamp,
            files,
            message,
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.body_lines().join("\n")
    }
}
