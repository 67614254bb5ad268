use serde::{Deserialize, Serialize};
use crate::enums::file_status::FileStatus;
use crate::services::content_hasher::ContentHasher;

/// The content of one changed file at scan time. Immutable once captured;
/// a fresh scan of the working tree produces fresh snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub path: String,
    pub status: FileStatus,
    pub content: String,
    pub content_hash: String,
}

impl FileSnapshot {
    pub fn capture(path: String, status: FileStatus, content: String) -> Self {
        let content_hash = ContentHasher::hash(&content);
        Self {
            path,
            status,
            content,
            content_hash,
        }
    }
}
