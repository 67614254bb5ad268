use serde::{Deserialize, Serialize};
use crate::structs::api::raw_comment::RawComment;

/// Response to a review submission. A missing or empty `extension_data_id`
/// is a protocol failure; `comments` may carry a synchronous first batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub extension_data_id: Option<String>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}
