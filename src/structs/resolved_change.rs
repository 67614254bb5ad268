use serde::{Deserialize, Serialize};
use crate::enums::file_status::FileStatus;

/// One file the resolver decided still needs review, with the patch to
/// submit and the content that becomes the next reviewed snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedChange {
    pub path: String,
    pub status: FileStatus,
    pub patch: String,
    pub additions: u32,
    pub deletions: u32,
    pub content: String,
}
