use serde::{Deserialize, Serialize};

/// Comment payload as delivered by the review service. The `content` blob is
/// semi-structured text carrying `**File**`, `**Line_Start**`, `**Severity**`
/// and `**Title**` markers; field values here take precedence when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub line_start: u32,
    #[serde(default)]
    pub line_end: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub content: String,
}
