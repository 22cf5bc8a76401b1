use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog article.
///
/// A post without an `id` has never been saved. `author_id` is assigned on
/// the first save and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<Uuid>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    /// Identifier handed out by the file store.
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub views: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create an unsaved post.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// A post can only be persisted with a title and a body.
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.body.trim().is_empty()
    }

    /// Cover image identifier, treating an empty string as absent.
    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref().filter(|c| !c.is_empty())
    }

    /// Count one more read of this post.
    pub fn record_view(mut self) -> Self {
        self.views = self.views.saturating_add(1);
        self
    }
}
