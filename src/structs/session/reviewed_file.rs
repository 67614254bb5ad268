use serde::{Deserialize, Serialize};
use crate::enums::severity::Severity;
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::comment::Comment;
use crate::services::content_hasher::ContentHasher;

/// Per-file record inside a session. `last_reviewed_hash` is the hash of the
/// full file content at review time, never of the patch; a file is unchanged
/// since its last review iff its current content hash equals this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedFile {
    pub file_path: String,
    pub last_reviewed_hash: String,
    pub last_reviewed_content: String,
    pub last_reviewed_patch: String,
    pub comments: Vec<Comment>,
    pub critical_count: u32,
    pub high_count: u32,
    pub issue_count: u32,
    pub expanded: bool,
}

impl ReviewedFile {
    pub fn from_change(change: &ResolvedChange) -> Self {
        Self {
            file_path: change.path.clone(),
            last_reviewed_hash: ContentHasher::hash(&change.content),
            last_reviewed_content: change.content.clone(),
            last_reviewed_patch: change.patch.clone(),
            comments: Vec::new(),
            critical_count: 0,
            high_count: 0,
            issue_count: 0,
            expanded: false,
        }
    }

    /// Group created when the server references a path outside the submitted
    /// set. The empty hash sentinel never matches a real content hash, so the
    /// file always counts as changed on the next scan.
    pub fn placeholder(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            last_reviewed_hash: String::new(),
            last_reviewed_content: String::new(),
            last_reviewed_patch: String::new(),
            comments: Vec::new(),
            critical_count: 0,
            high_count: 0,
            issue_count: 0,
            expanded: false,
        }
    }

    pub fn record_severity(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical_count += 1,
            Severity::High => self.high_count += 1,
            _ => {}
        }
        self.issue_count = self.critical_count + self.high_count;
    }
}
