use serde::{Deserialize, Serialize};
use crate::helpers::compression;
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::branch_ref::BranchRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub repository: RepositoryMeta,
    pub branch: BranchRef,
    pub changes: ChangesPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMeta {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesPayload {
    pub summary: ChangeSummary,
    pub commits: Vec<String>,
    pub files: Vec<FileEntry>,
    #[serde(rename = "fullDiff")]
    pub full_diff: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub files: u32,
    pub additions: u32,
    pub deletions: u32,
}

/// Per-file submission entry. Patch and content over the size threshold are
/// shipped gzip+base64 in the `_compressed` variants, with the plain field
/// removed and the marker set; the service accepts either representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    pub status: String,
    pub additions: u32,
    pub deletions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_compressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_compressed: Option<String>,
    #[serde(rename = "_compressed", default, skip_serializing_if = "Option::is_none")]
    pub compressed: Option<bool>,
}

impl FileEntry {
    pub fn from_change(change: &ResolvedChange) -> Self {
        let patch = compression::pack_field(&change.patch);
        let content = compression::pack_field(&change.content);
        let compressed = patch.compressed.is_some() || content.compressed.is_some();
        Self {
            filename: change.path.clone(),
            status: change.status.as_str().to_string(),
            additions: change.additions,
            deletions: change.deletions,
            patch: patch.plain,
            patch_compressed: patch.compressed,
            content: content.plain,
            content_compressed: content.compressed,
            compressed: compressed.then_some(true),
        }
    }
}
