//! Secure storage providers
//!
//! Key/value persistence for credentials. Platforms with a keychain plug in
//! their own [`SecureStorageProvider`]; the SDK ships an in-memory store and a
//! JSON file store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, SdkError};

#[async_trait]
pub trait SecureStorageProvider: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySecureStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorageProvider for MemorySecureStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object on disk.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash never leaves a half-written file behind. On unix the file is
/// readable by its owner only.
pub struct FileSecureStorage {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSecureStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match self.read().await? {
            Some(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .map_err(|e| SdkError::storage(format!("{} is corrupt: {}", self.path.display(), e))),
            _ => Ok(HashMap::new()),
        }
    }

    /// Current contents ahead of a write. A corrupt file is started over;
    /// a file that cannot be read is left alone and the error returned.
    async fn load_for_write(&self) -> Result<HashMap<String, String>> {
        match self.read().await? {
            Some(bytes) if !bytes.is_empty() => Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), "Replacing corrupt secure storage: {}", e);
                HashMap::new()
            })),
            _ => Ok(HashMap::new()),
        }
    }

    async fn store(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(values)?).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = values.len(), "Secure storage written");
        Ok(())
    }
}

#[async_trait]
impl SecureStorageProvider for FileSecureStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load_for_write().await?;
        values.insert(key.to_string(), value.to_string());
        self.store(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load_for_write().await?;
        if values.remove(key).is_some() {
            self.store(&values).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemorySecureStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secure.json");

        FileSecureStorage::new(&path).set("auth_token", "abc").await.unwrap();
        let reopened = FileSecureStorage::new(&path);
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("abc"));

        reopened.remove("auth_token").await.unwrap();
        assert_eq!(reopened.get("auth_token").await.unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.json");
        std::fs::write(&path, b"{not json").unwrap();

        let storage = FileSecureStorage::new(&path);
        assert!(storage.get("anything").await.is_err());

        storage.set("user_id", "u1").await.unwrap();
        assert_eq!(storage.get("user_id").await.unwrap().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_writes_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        // a directory at the storage path cannot be read as a file
        let path = dir.path().join("secure.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let storage = FileSecureStorage::new(&path);
        assert!(storage.set("auth_token", "abc").await.is_err());
        assert!(storage.remove("auth_token").await.is_err());
        assert!(path.is_dir());
        assert!(path.join("keep").exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.json");
        let storage = FileSecureStorage::new(&path);
        storage.set("auth_token", "abc").await.unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);

        storage.set("refresh_token", "def").await.unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
