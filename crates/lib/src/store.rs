//! Durable key/value store: one file per key under the state directory.
//!
//! Backs the session manager's thread, history log, and theme flag. Each key
//! is read and written independently; there is no cross-key atomicity. A
//! missing or unreadable entry reads as absent, never as an error.

use std::path::{Path, PathBuf};

/// Store key for the serialized live thread.
pub const THREAD_KEY: &str = "chat_messages";
/// Store key for the serialized history log.
pub const HISTORY_KEY: &str = "chat_history";
/// Store key for the boolean-as-string theme flag.
pub const THEME_KEY: &str = "dark_mode";

/// File-backed key/value store. Keys map to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read the raw value for a key. Missing or unreadable entries return None.
    pub async fn read(&self, key: &str) -> Option<String> {
        tokio::fs::read_to_string(self.path_for(key)).await.ok()
    }

    /// Write the raw value for a key, creating the state directory if needed.
    pub async fn write(&self, key: &str, value: &str) -> std::io::Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, value).await
    }

    /// Delete a key. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
