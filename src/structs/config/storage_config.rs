use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default `~/.revline/state` session storage directory.
    #[serde(default)]
    pub state_dir: Option<String>,
}
