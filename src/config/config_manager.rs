use std::fs;
use std::path::PathBuf;
use crate::config::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::errors::{RevlineError, RevlineResult};
use crate::structs::config::config::Config;

pub struct ConfigManager;

impl ConfigManager {
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .unwrap_or_default()
    }

    pub fn load() -> RevlineResult<Config> {
        let config_path = Self::config_path();

        if config_path.exists() {
            log::info!("📋 Loading config from: {}", config_path.display());
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            return Ok(config);
        }

        Ok(Config::default())
    }

    pub fn create_sample_config() -> RevlineResult<()> {
        let config_path = Self::config_path();
        if config_path.exists() {
            return Err(RevlineError::ConfigurationFileError {
                path: config_path.display().to_string(),
                reason: "configuration file already exists".to_string(),
            });
        }

        let sample_config = r#"# Revline Configuration

[server]
# Base URL of the review service
base_url = "http://localhost:8787"

# Environment variable holding the API token (sent as a bearer token when set)
api_token_env = "REVLINE_API_TOKEN"

# Per-request timeout in seconds
request_timeout_secs = 30

[polling]
# Seconds between status/comment fetches while a review is analyzed
interval_secs = 10

# Hard cap on fetches per review; polling stops when reached
max_ticks = 720

# Consecutive fetch errors tolerated before giving up
error_threshold = 5

[review]
# Branch the submission is reviewed against
base_branch = "main"

# Extra file extensions to exclude from review, e.g. ["snap", "min.js"]
exclude_extensions = []

[storage]
# Uncomment to override where per-workspace session state is stored
# state_dir = "/home/user/.revline/state"
"#;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, sample_config)?;
        log::info!("📝 Sample configuration written to {}", config_path.display());

        Ok(())
    }

    pub fn validate_config(config: &Config) -> RevlineResult<()> {
        if config.server.base_url.trim().is_empty() {
            return Err(RevlineError::config_error(
                "server base_url must not be empty",
                Some("server.base_url"),
                Some("set it to the review service URL, e.g. http://localhost:8787"),
            ));
        }
        if !config.server.base_url.starts_with("http://") && !config.server.base_url.starts_with("https://") {
            return Err(RevlineError::config_error(
                "server base_url must be an http(s) URL",
                Some("server.base_url"),
                None,
            ));
        }
        if config.polling.interval_secs == 0 {
            return Err(RevlineError::config_error(
                "polling interval must be at least one second",
                Some("polling.interval_secs"),
                None,
            ));
        }
        if config.polling.max_ticks == 0 {
            return Err(RevlineError::config_error(
                "polling tick cap must be positive",
                Some("polling.max_ticks"),
                None,
            ));
        }
        if config.polling.error_threshold == 0 {
            return Err(RevlineError::config_error(
                "polling error threshold must be positive",
                Some("polling.error_threshold"),
                None,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConfigManager::validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut config = Config::default();
        config.server.base_url = "  ".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut config = Config::default();
        config.server.base_url = "ftp://reviews.example".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.polling.interval_secs = 0;
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn config_parses_from_partial_toml() {
        let config: Config = toml::from_str("[polling]\ninterval_secs = 3\n").unwrap();
        assert_eq!(config.polling.interval_secs, 3);
        assert_eq!(config.polling.max_ticks, crate::config::constants::DEFAULT_MAX_POLL_TICKS);
        assert_eq!(config.server.base_url, crate::config::constants::DEFAULT_BASE_URL);
    }
}
