use std::fs::Metadata;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;

/// Size, modification time, and optional content digest of one side of a
/// comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// File size in bytes.
    pub size: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Utc>>,
    /// Content digest; populated only for hash-compared files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentDigest>,
}

impl FileMeta {
    /// Create metadata with an explicit size and no timestamp or digest.
    pub fn new(size: u64) -> Self {
        Self {
            size,
            modified: None,
            hash: None,
        }
    }

    /// Capture size and mtime from filesystem metadata.
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            hash: None,
        }
    }

    /// Attach a content digest.
    pub fn with_hash(mut self, hash: ContentDigest) -> Self {
        self.hash = Some(hash);
        self
    }
}
