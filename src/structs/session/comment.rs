use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::enums::severity::Severity;

/// One review comment anchored to a file and line range. Line anchors are
/// 1-indexed in wire and storage form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub severity: Severity,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

impl Comment {
    /// Raw comments carry no identity of their own; one is synthesized from
    /// the job that delivered the comment.
    pub fn synthesize_id(data_id: &str) -> String {
        format!("{}-{}", data_id, Uuid::new_v4())
    }
}
