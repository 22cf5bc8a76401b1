//! In-memory file store - used when no upload directory is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use folio_core::domain::UploadedFile;
use folio_core::error::StorageError;
use folio_core::ports::FileStore;

/// Keeps uploaded bytes in a HashMap.
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, identifier: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(identifier).cloned()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError> {
        let identifier = super::new_identifier(file);
        self.files
            .write()
            .await
            .insert(identifier.clone(), file.data.clone());
        Ok(identifier)
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        self.files
            .write()
            .await
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_delete() {
        let store = InMemoryFileStore::new();
        let file = UploadedFile::new("cover.JPG", "image/jpeg", vec![1, 2, 3]);

        let id = store.store(&file).await.unwrap();
        assert!(id.ends_with(".jpg"));
        assert_eq!(store.get(&id).await, Some(vec![1, 2, 3]));

        store.delete(&id).await.unwrap();
        assert_eq!(store.get(&id).await, None);
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let store = InMemoryFileStore::new();

        let result = store.delete("missing.png").await;

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
