use serde::{Deserialize, Serialize};
use crate::config::constants::DEFAULT_BASE_BRANCH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    /// Extra file extensions to exclude from review on top of the built-in
    /// binary/media/lockfile set.
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            base_branch: default_base_branch(),
            exclude_extensions: Vec::new(),
        }
    }
}

fn default_base_branch() -> String {
    DEFAULT_BASE_BRANCH.to_string()
}
