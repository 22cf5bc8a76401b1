//! File storage port - where uploaded cover images end up.

use async_trait::async_trait;

use crate::domain::UploadedFile;
use crate::error::StorageError;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist the file and return the identifier it can be found under.
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError>;

    /// Remove a previously stored file.
    async fn delete(&self, identifier: &str) -> Result<(), StorageError>;
}
