use serde::{Deserialize, Serialize};
use crate::structs::api::raw_comment::RawComment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<RawComment>,
    #[serde(default)]
    pub count: usize,
}
