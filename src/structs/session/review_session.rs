use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::session_status::SessionStatus;
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::branch_ref::BranchRef;
use crate::structs::session::reviewed_file::ReviewedFile;

/// One submitted review and its accumulating comments and status.
/// `data_id` is assigned by the remote service and joins the session to its
/// status, comments and stop endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub data_id: String,
    pub title: String,
    pub branch: BranchRef,
    pub status: SessionStatus,
    pub total_comments: u32,
    pub resolved_comments: u32,
    pub files: Vec<ReviewedFile>,
    pub created_at: DateTime<Utc>,
}

impl ReviewSession {
    pub fn new(data_id: String, title: String, branch: BranchRef, changes: &[ResolvedChange]) -> Self {
        Self {
            data_id,
            title,
            branch,
            status: SessionStatus::Running,
            total_comments: 0,
            resolved_comments: 0,
            files: changes.iter().map(ReviewedFile::from_change).collect(),
            created_at: Utc::now(),
        }
    }

    pub fn find_file(&self, file_path: &str) -> Option<&ReviewedFile> {
        self.files.iter().find(|f| f.file_path == file_path)
    }

    /// Finds the group for a path, creating a placeholder when missing.
    pub fn file_group_mut(&mut self, file_path: &str) -> &mut ReviewedFile {
        if let Some(index) = self.files.iter().position(|f| f.file_path == file_path) {
            return &mut self.files[index];
        }
        self.files.push(ReviewedFile::placeholder(file_path));
        self.files.last_mut().unwrap()
    }

    pub fn comment_count(&self) -> u32 {
        self.files.iter().map(|f| f.comments.len() as u32).sum()
    }
}
