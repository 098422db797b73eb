//! Typed object identifier
//!
//! Object ids are a one-character type tag followed by the 40-character
//! hexadecimal SHA-1 of the object's canonical content, e.g. `b3f1...` for a
//! blob or `c9a0...` for a commit. Blobs and commits share one flat keyspace,
//! the tag is what lets a scan tell them apart.
//!
//! ## Storage
//!
//! Objects are stored flat as `.twig/objects/<id>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;

/// Length of the abbreviated form, tag included
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;

/// Tagged content hash identifying a blob or a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if the tag, length or digits are invalid
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }

        let mut chars = id.chars();
        let tag = chars.next().unwrap_or_default();
        if ObjectType::from_tag(tag).is_none() {
            return Err(anyhow::anyhow!("Invalid object ID tag: {}", id));
        }
        if !chars.all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }

        Ok(Self(id))
    }

    /// Build an id from a type and the hex digest of its content
    pub fn from_digest(object_type: ObjectType, digest: &str) -> anyhow::Result<Self> {
        Self::try_parse(format!("{}{}", object_type.tag(), digest))
    }

    pub fn object_type(&self) -> ObjectType {
        self.0
            .chars()
            .next()
            .and_then(ObjectType::from_tag)
            .unwrap_or(ObjectType::Blob)
    }

    pub fn is_commit(&self) -> bool {
        self.object_type() == ObjectType::Commit
    }

    /// File name of the object inside the objects directory
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Get abbreviated form of the object id
    ///
    /// # Returns
    ///
    /// First 7 characters, tag included
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(SHORT_OBJECT_ID_LENGTH).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    const DIGEST: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn tag_decides_the_object_type() {
        let blob = ObjectId::from_digest(ObjectType::Blob, DIGEST).unwrap();
        let commit = ObjectId::from_digest(ObjectType::Commit, DIGEST).unwrap();

        assert_eq!(blob.object_type(), ObjectType::Blob);
        assert!(commit.is_commit());
        assert_eq!(commit.to_short_oid(), "c012345");
    }

    #[test]
    fn untagged_sha1_is_rejected() {
        assert!(ObjectId::try_parse(format!("x{DIGEST}")).is_err());
        assert!(ObjectId::try_parse(DIGEST.to_string()).is_err());
    }

    proptest! {
        #[test]
        fn any_tagged_hex_digest_parses(digest in "[0-9a-f]{40}", tag in "[bc]") {
            let id = ObjectId::try_parse(format!("{tag}{digest}")).unwrap();
            assert_eq!(id.as_ref().len(), OBJECT_ID_LENGTH);
        }
    }
}
