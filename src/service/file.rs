use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{NotebridgeError, Result};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{FileOwner, FileUpload, NewFileMetadata, StoredFile};
use crate::repository::FileRepository;
use crate::storage::BlobStore;
use crate::validation::InputValidator;

/// Uploads to the object store with a metadata row per file.
///
/// An upload writes the blob first and the metadata row second. When the
/// second write fails the blob and any row are deleted again before the
/// error is returned; failures of that cleanup are only logged.
#[derive(Clone)]
pub struct FileService {
    repo: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    metrics: MetricsCollector,
    max_upload_bytes: usize,
}

impl FileService {
    #[must_use]
    pub fn new(repo: Arc<dyn FileRepository>, blobs: Arc<dyn BlobStore>, max_upload_bytes: usize) -> Self {
        Self {
            repo,
            blobs,
            metrics: MetricsCollector::default(),
            max_upload_bytes,
        }
    }

    /// Store a file with no owner. Returns the public file id.
    pub async fn upload_file(&self, upload: FileUpload) -> Result<String> {
        self.store(FileOwner::Unowned, upload).await
    }

    /// Store a profile picture for `user_id`
    pub async fn upload_profile_picture(&self, user_id: i64, upload: FileUpload) -> Result<String> {
        self.store(FileOwner::User(user_id), upload).await
    }

    /// Store a picture attached to `lesson_id`
    pub async fn upload_lesson_picture(&self, lesson_id: i64, upload: FileUpload) -> Result<String> {
        self.store(FileOwner::Lesson(lesson_id), upload).await
    }

    /// Fetch a file back by its public id
    pub async fn retrieve_file(&self, unique_id: &str) -> Result<StoredFile> {
        let Some(metadata) = self.repo.find_by_unique_id(unique_id)? else {
            self.metrics.record_retrieval(false);
            return Err(NotebridgeError::not_found(format!("File not found with ID: {unique_id}")));
        };

        let Some(content) = self.blobs.get(&metadata.object_name).await? else {
            warn!(unique_id, object_name = %metadata.object_name, "Metadata row points at a missing object");
            self.metrics.record_retrieval(false);
            return Err(NotebridgeError::not_found(format!("File content not found for ID: {unique_id}")));
        };

        self.metrics.record_retrieval(true);
        Ok(StoredFile {
            file_name: metadata.object_name,
            content,
        })
    }

    async fn store(&self, owner: FileOwner, upload: FileUpload) -> Result<String> {
        let kind = owner.kind();
        let size = upload.data.len();

        if upload.data.is_empty() {
            return Err(NotebridgeError::validation("File is empty"));
        }
        if size > self.max_upload_bytes {
            return Err(NotebridgeError::validation(format!(
                "File too large (max {} bytes)",
                self.max_upload_bytes
            )));
        }
        if !self.repo.owner_exists(owner)? {
            return Err(match owner {
                FileOwner::User(id) => NotebridgeError::not_found(format!("User not found with ID: {id}")),
                FileOwner::Lesson(id) => NotebridgeError::not_found(format!("Lesson not found with ID: {id}")),
                FileOwner::Unowned => NotebridgeError::not_found("Owner not found"),
            });
        }

        let timer = OperationTimer::new("file_upload");
        let started = std::time::Instant::now();

        let unique_id = Uuid::new_v4().to_string();
        let object_name = match upload.file_name.as_deref().and_then(InputValidator::sanitize_file_name) {
            Some(name) => format!("{}_{name}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        if let Err(err) = self.blobs.put(&object_name, upload.data, upload.content_type).await {
            error!(kind, object_name = %object_name, error = %err, "Blob write failed");
            self.metrics.record_upload(kind, size, started.elapsed(), false);
            return Err(err);
        }

        let new_file = NewFileMetadata {
            unique_id: unique_id.clone(),
            object_name: object_name.clone(),
            upload_date: Utc::now(),
            owner,
        };

        match self.repo.save(new_file) {
            Ok(metadata) => {
                timer.finish();
                self.metrics.record_upload(kind, size, started.elapsed(), true);
                info!(kind, unique_id = %metadata.unique_id, size, "Stored file");
                Ok(metadata.unique_id)
            }
            Err(err) => {
                error!(kind, unique_id = %unique_id, error = %err, "Metadata write failed, removing blob");
                self.compensate(&object_name, &unique_id).await;
                self.metrics.record_upload(kind, size, started.elapsed(), false);
                Err(err)
            }
        }
    }

    async fn compensate(&self, object_name: &str, unique_id: &str) {
        let blob_deleted = match self.blobs.delete(object_name).await {
            Ok(()) => true,
            Err(e) => {
                error!(object_name, error = %e, "Failed to delete orphaned blob");
                false
            }
        };

        let row_deleted = match self.repo.delete_by_unique_id(unique_id) {
            Ok(_) => true,
            Err(e) => {
                error!(unique_id, error = %e, "Failed to delete partial metadata row");
                false
            }
        };

        self.metrics.record_compensation(blob_deleted, row_deleted);
    }
}
