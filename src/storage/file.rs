//! File-backed storage: one JSON file per key under a data directory.
//!
//! Writes go to a temp file in the same directory followed by a rename, so a
//! record is either the old whole value or the new whole value — never a
//! partial write.

use super::{SessionStorage, StorageError};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Key-value store mapping each key to `<dir>/<sanitized-key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open the platform default store (`ProjectDirs` data directory).
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("app", "CampusFind", "campusfind")
            .context("No home directory available for session storage")?;
        Self::new(dirs.data_dir().join("session"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys like "@user" are not filesystem-safe as-is.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, FileStorage) {
        let tmp = TempDir::new().unwrap();
        let store = FileStorage::new(tmp.path().join("session")).unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let (_tmp, store) = test_store();
        store.set("@user", "{\"user\":{}}").await.unwrap();
        assert_eq!(
            store.get("@user").await.unwrap().as_deref(),
            Some("{\"user\":{}}")
        );
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_tmp, store) = test_store();
        assert!(store.get("@user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn key_is_sanitized_to_a_single_file() {
        let (_tmp, store) = test_store();
        store.set("@user", "v1").await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].as_ref().unwrap().file_name().to_str(),
            Some("_user.json")
        );
    }

    #[tokio::test]
    async fn set_replaces_whole_value() {
        let (_tmp, store) = test_store();
        store.set("@user", "a-longer-first-value").await.unwrap();
        store.set("@user", "short").await.unwrap();
        assert_eq!(store.get("@user").await.unwrap().as_deref(), Some("short"));
    }

    #[tokio::test]
    async fn delete_removes_file_and_is_idempotent() {
        let (_tmp, store) = test_store();
        store.set("@user", "v").await.unwrap();
        store.delete("@user").await.unwrap();
        store.delete("@user").await.unwrap();
        assert!(store.get("@user").await.unwrap().is_none());
    }
}
