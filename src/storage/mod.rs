//! Remote blob storage.
//!
//! Uploaded bytes live in an object store keyed by an opaque object name. The
//! production backend is any S3-compatible bucket; a local directory backend
//! exists for development and tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::error::Result;

mod local;
mod s3;

pub use local::FsBlobStore;
pub use s3::S3BlobStore;

/// Key-based put/get/delete over an object store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing anything already there
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<String>) -> Result<()>;

    /// Fetch the bytes under `key`, or `None` if no such object exists
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove the object under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Build the backend selected by `storage.backend`
pub async fn build_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.backend.as_str() {
        "s3" => {
            let store = S3BlobStore::new(
                config.bucket.clone(),
                config.region.clone(),
                config.endpoint_url.clone(),
            )
            .await;
            Ok(Arc::new(store))
        }
        "local" => Ok(Arc::new(FsBlobStore::new(&config.local_root))),
        other => Err(anyhow::anyhow!("Unknown storage backend: {other}")),
    }
}
