use sha2::{Digest, Sha256};
use crate::config::constants::WORKSPACE_KEY_LENGTH;

pub struct ContentHasher;

impl ContentHasher {
    /// SHA-256 over the UTF-8 bytes, hex encoded. Empty or whitespace-only
    /// content maps to the empty string, a sentinel that never matches a
    /// real digest; deleted and unreadable files always count as changed.
    pub fn hash(content: &str) -> String {
        if content.trim().is_empty() {
            return String::new();
        }
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Short stable key naming a workspace's state directory.
    pub fn workspace_key(workspace_path: &str) -> String {
        let digest = Self::hash(workspace_path);
        if digest.len() < WORKSPACE_KEY_LENGTH {
            return "default".to_string();
        }
        digest[..WORKSPACE_KEY_LENGTH].to_string()
    }
}
