use serde::{Deserialize, Serialize};

/// A file received with a request, not yet handed to a file store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Browsers send an empty part when no file was picked.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the declared content type names an image.
    pub fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("image")
    }

    /// Lowercased extension of the original filename, if it has a usable one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
