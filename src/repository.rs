//! Repository seams for the file storage service.
//!
//! `FileService` talks to its metadata store through [`FileRepository`] so the
//! upload compensation path can be exercised with a mock that fails on demand.

use crate::db::Database;
use crate::error::Result;
use crate::models::{FileMetadata, FileOwner, NewFileMetadata};

/// Metadata persistence used by the file storage service
#[cfg_attr(test, mockall::automock)]
pub trait FileRepository: Send + Sync {
    /// Whether the user or lesson a file is being attached to exists
    fn owner_exists(&self, owner: FileOwner) -> Result<bool>;

    /// Record a metadata row for a freshly written blob
    fn save(&self, new_file: NewFileMetadata) -> Result<FileMetadata>;

    /// Resolve a public handle to its metadata row
    fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<FileMetadata>>;

    /// Remove the row for a public handle, returning how many rows went away
    fn delete_by_unique_id(&self, unique_id: &str) -> Result<usize>;
}

impl FileRepository for Database {
    fn owner_exists(&self, owner: FileOwner) -> Result<bool> {
        self.file_owner_exists(owner)
    }

    fn save(&self, new_file: NewFileMetadata) -> Result<FileMetadata> {
        self.insert_file_metadata(&new_file)
    }

    fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<FileMetadata>> {
        self.find_file_metadata(unique_id)
    }

    fn delete_by_unique_id(&self, unique_id: &str) -> Result<usize> {
        self.delete_file_metadata(unique_id)
    }
}
