//! Post record model

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::loader::to_slash;
use super::FieldValue;

/// Where a post's body lives inside its source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyRef {
    /// Byte offset of the body within the source file
    pub offset: usize,

    /// Body length in bytes
    pub length: usize,

    /// Hex SHA-256 of the body bytes
    pub sha256: String,
}

impl BodyRef {
    pub fn new(body: &str, offset: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        Self {
            offset,
            length: body.len(),
            sha256: format!("{:x}", hasher.finalize()),
        }
    }
}

/// One validated Markdown post
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    /// Source path relative to the content directory
    pub source_path: PathBuf,

    /// Post title, exactly as written
    pub title: String,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Drafts stay in the manifest; consumers decide visibility
    pub draft: bool,

    /// Tags in the order they were written
    pub tags: Vec<String>,

    /// Unique identifier derived from the filename
    pub slug: String,

    /// Markdown after the front-matter, never interpreted here
    pub body: String,

    /// Location of `body` within the source file
    pub body_ref: BodyRef,

    /// Front-matter keys with no dedicated field
    pub extra: IndexMap<String, FieldValue>,
}

impl PostRecord {
    /// Source path with `/` separators on every platform
    pub fn source(&self) -> String {
        to_slash(&self.source_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_ref_digest() {
        let body = BodyRef::new("hello\n", 42);
        assert_eq!(body.offset, 42);
        assert_eq!(body.length, 6);
        assert_eq!(
            body.sha256,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn test_source_uses_forward_slashes() {
        let post = PostRecord {
            source_path: PathBuf::from("2025").join("kafka.md"),
            title: "Kafka".to_string(),
            date: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap(),
            draft: false,
            tags: Vec::new(),
            slug: "kafka".to_string(),
            body: String::new(),
            body_ref: BodyRef::new("", 0),
            extra: IndexMap::new(),
        };
        assert_eq!(post.source(), "2025/kafka.md");
    }
}
