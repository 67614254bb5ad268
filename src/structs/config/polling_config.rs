use serde::{Deserialize, Serialize};
use crate::config::constants::{DEFAULT_MAX_POLL_TICKS, DEFAULT_POLL_ERROR_THRESHOLD, DEFAULT_POLL_INTERVAL_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_ticks: default_max_ticks(),
            error_threshold: default_error_threshold(),
        }
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_max_ticks() -> u32 {
    DEFAULT_MAX_POLL_TICKS
}

fn default_error_threshold() -> u32 {
    DEFAULT_POLL_ERROR_THRESHOLD
}
