use std::time::Duration;

pub const CONFIG_DIR_NAME: &str = ".revline";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const STATE_DIR_NAME: &str = "state";
pub const STATE_FILE_NAME: &str = "sessions.json";
pub const WORKSPACE_KEY_LENGTH: usize = 16;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8787";
pub const DEFAULT_API_TOKEN_ENV: &str = "REVLINE_API_TOKEN";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BASE_BRANCH: &str = "main";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MAX_POLL_TICKS: u32 = 720;
pub const DEFAULT_POLL_ERROR_THRESHOLD: u32 = 5;

pub const COMPRESSION_THRESHOLD_BYTES: usize = 1024;

/// Reviewing these yields no value: binary, media, archive, font, lockfile
/// and design-tool formats.
pub const EXCLUDED_FILE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp", "ico", "svg",
    "mp3", "mp4", "wav", "mov", "avi",
    "zip", "tar", "gz", "7z", "rar",
    "pdf", "psd", "sketch", "fig", "xcf",
    "woff", "woff2", "ttf", "eot", "otf",
    "lock", "bin", "exe", "dll", "so", "dylib", "class", "o", "a",
];

pub fn poll_interval(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
