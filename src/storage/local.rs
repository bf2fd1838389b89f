use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::BlobStore;
use crate::error::{NotebridgeError, Result};

/// Blob store that keeps one file per key under a root directory
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Store objects under `root`, created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(NotebridgeError::Storage(format!("Invalid object key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: Option<String>) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, data).await?;
        debug!(path = %path.display(), "Wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));

        assert!(store.get("abc_photo.png").await.unwrap().is_none());
        store.put("abc_photo.png", b"png".to_vec(), None).await.unwrap();
        assert_eq!(store.get("abc_photo.png").await.unwrap().unwrap(), b"png");

        store.delete("abc_photo.png").await.unwrap();
        assert!(store.get("abc_photo.png").await.unwrap().is_none());
        // Deleting twice is fine
        store.delete("abc_photo.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.put("../escape", vec![1], None).await.is_err());
        assert!(store.get("a/b").await.is_err());
    }
}
