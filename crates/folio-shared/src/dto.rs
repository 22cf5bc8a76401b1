//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create or update a post. A request with an `id` updates that post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePostRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Cover image the client wants; must differ from the current one for
    /// an upload to replace it.
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub cover_upload: Option<CoverUpload>,
}

/// Uploaded cover image, carried inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
