use serde::{Deserialize, Serialize};
use crate::enums::analysis_status::AnalysisStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub analysis_status: String,
    #[serde(default)]
    pub data_id: String,
}

impl StatusResponse {
    /// None for status strings this client does not know; callers treat
    /// those as non-terminal.
    pub fn status(&self) -> Option<AnalysisStatus> {
        AnalysisStatus::parse(&self.analysis_status)
    }
}
