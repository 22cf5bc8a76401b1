//! Local disk file store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use folio_core::domain::UploadedFile;
use folio_core::error::StorageError;
use folio_core::ports::FileStore;

/// Writes uploads as flat files under a root directory.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Use `root` for uploads, creating it if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), "Local file store ready");
        Ok(Self { root })
    }

    /// Only bare file names are accepted as identifiers.
    fn path_for(&self, identifier: &str) -> Result<PathBuf, StorageError> {
        let valid = !identifier.is_empty()
            && identifier != "."
            && !identifier.contains("..")
            && !identifier.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::InvalidIdentifier(identifier.to_string()));
        }
        Ok(self.root.join(identifier))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError> {
        let identifier = super::new_identifier(file);
        let path = self.path_for(&identifier)?;

        tokio::fs::write(&path, &file.data).await?;
        tracing::debug!(
            file = %identifier,
            bytes = file.data.len(),
            content_type = %file.content_type,
            "Stored upload"
        );

        Ok(identifier)
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        let path = self.path_for(identifier)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %identifier, "Deleted upload");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
