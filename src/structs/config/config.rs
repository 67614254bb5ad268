use serde::{Deserialize, Serialize};
use crate::structs::config::polling_config::PollingConfig;
use crate::structs::config::review_config::ReviewConfig;
use crate::structs::config::server_config::ServerConfig;
use crate::structs::config::storage_config::StorageConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}
