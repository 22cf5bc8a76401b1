//! Post workflow: create-or-update, validation and listing views.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Page, PageRequest, Post, UploadedFile, User};
use crate::error::DomainError;
use crate::ports::{
    CategoryRepository, FileStore, Job, JobHandler, JobQueue, JobResult, PostRepository,
};

/// Size of the trending side list shown next to every listing.
pub const TRENDING_POSTS: u64 = 4;

/// Job type used for deferred view count saves.
pub const VIEW_INCREMENT_JOB: &str = "post.views.persist";

/// Payload of a [`VIEW_INCREMENT_JOB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewIncrement {
    pub post_id: Uuid,
}

/// Post service configuration.
#[derive(Debug, Clone)]
pub struct PostServiceConfig {
    /// Path of the read view; the post id is appended to it.
    pub read_path: String,
}

impl Default for PostServiceConfig {
    fn default() -> Self {
        Self {
            read_path: "/api/posts".to_string(),
        }
    }
}

/// Outcome of a successful create or update.
#[derive(Debug, Clone, Serialize)]
pub struct SavedPost {
    pub post: Post,
    pub status: String,
    pub redirect_url: String,
}

/// Why a submitted post was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("missing required fields")]
    MissingRequiredFields,

    #[error("non-image file rejected")]
    NonImageFile,
}

/// Result of checking a submitted post before it is saved.
///
/// A successful outcome carries neither the post nor an error.
#[derive(Debug, Clone)]
pub struct PostValidation {
    pub success: bool,
    pub redirect_url: String,
    pub post: Option<Post>,
    pub error: Option<ValidationFailure>,
}

impl PostValidation {
    fn valid(redirect_url: String) -> Self {
        Self {
            success: true,
            redirect_url,
            post: None,
            error: None,
        }
    }

    fn rejected(post: &Post, failure: ValidationFailure, redirect_url: String) -> Self {
        Self {
            success: false,
            redirect_url,
            post: Some(post.clone()),
            error: Some(failure),
        }
    }
}

/// A page of posts ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct PagedView {
    pub title: String,
    pub posts: Vec<Post>,
    /// One-based.
    pub current_page: u64,
    pub total_pages: u64,
    /// Older posts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
    /// Newer posts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_link: Option<String>,
    pub trending_posts: Vec<Post>,
}

/// Post workflows.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    files: Arc<dyn FileStore>,
    jobs: Arc<dyn JobQueue>,
    config: PostServiceConfig,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        files: Arc<dyn FileStore>,
        jobs: Arc<dyn JobQueue>,
        config: PostServiceConfig,
    ) -> Self {
        Self {
            posts,
            categories,
            files,
            jobs,
            config,
        }
    }

    /// Create the post if it has no id yet, otherwise update the stored one.
    ///
    /// `user` only matters on creation: it becomes the author. An update keeps
    /// the original author.
    pub async fn upsert_post(
        &self,
        candidate: Post,
        category_id: Option<Uuid>,
        file: Option<&UploadedFile>,
        user: &User,
    ) -> Result<SavedPost, DomainError> {
        let category_id = self.resolve_category(category_id).await?;
        let file = file.filter(|f| !f.is_empty());

        match candidate.id {
            Some(id) => self.update_post(id, candidate, category_id, file).await,
            None => self.create_post(candidate, category_id, file, user).await,
        }
    }

    async fn update_post(
        &self,
        id: Uuid,
        candidate: Post,
        category_id: Option<Uuid>,
        file: Option<&UploadedFile>,
    ) -> Result<SavedPost, DomainError> {
        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })?;
        tracing::debug!(post_id = %id, title = %existing.title, "Updating existing post");

        let cover_changed = candidate
            .cover_image()
            .is_some_and(|requested| existing.cover_image() != Some(requested));

        // New image goes in before the old one is removed.
        let cover_image = match file.filter(|_| cover_changed) {
            Some(file) => {
                let stored = self.files.store(file).await?;
                if let Some(old) = existing.cover_image() {
                    // The edit is saved even when the old file is already gone.
                    if let Err(e) = self.files.delete(old).await {
                        tracing::warn!(
                            post_id = %id,
                            cover_image = %old,
                            error = %e,
                            "Old cover image not removed"
                        );
                    }
                }
                tracing::debug!(post_id = %id, cover_image = %stored, "Cover image replaced");
                Some(stored)
            }
            None => existing.cover_image.clone(),
        };

        let merged = Post {
            title: candidate.title,
            body: candidate.body,
            tags: candidate.tags,
            category_id,
            cover_image,
            published: candidate.published,
            featured: candidate.featured,
            ..existing
        };

        let saved = self.posts.save(merged).await?;
        tracing::info!(post_id = %id, "Post updated");

        Ok(SavedPost {
            redirect_url: self.read_url(&saved),
            post: saved,
            status: "Post Updated Successfully".to_string(),
        })
    }

    async fn create_post(
        &self,
        candidate: Post,
        category_id: Option<Uuid>,
        file: Option<&UploadedFile>,
        user: &User,
    ) -> Result<SavedPost, DomainError> {
        // Only identifiers issued by the file store are ever kept.
        let cover_image = match file {
            Some(file) => Some(self.files.store(file).await?),
            None => None,
        };

        let post = Post {
            author_id: Some(user.id),
            category_id,
            cover_image,
            views: 0,
            ..candidate
        };

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = ?saved.id, author_id = %user.id, "Post created");

        Ok(SavedPost {
            redirect_url: self.read_url(&saved),
            post: saved,
            status: "Post Saved Successfully".to_string(),
        })
    }

    async fn resolve_category(&self, id: Option<Uuid>) -> Result<Option<Uuid>, DomainError> {
        let Some(id) = id else {
            return Ok(None);
        };

        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Category",
                id,
            })?;

        Ok(Some(category.id))
    }

    fn read_url(&self, post: &Post) -> String {
        let id = post.id.map(|id| id.to_string()).unwrap_or_default();
        format!("{}/{}", self.config.read_path, id)
    }

    /// Check a submitted post before anything is stored.
    ///
    /// Rules are applied in order and the first failure wins. Both outcomes
    /// point back at `<fallback_path>/edit`.
    pub fn validate_post(
        &self,
        candidate: &Post,
        file: Option<&UploadedFile>,
        fallback_path: &str,
    ) -> PostValidation {
        let redirect_url = format!("{fallback_path}/edit");

        if !candidate.has_required_fields() {
            return PostValidation::rejected(
                candidate,
                ValidationFailure::MissingRequiredFields,
                redirect_url,
            );
        }

        if file.is_some_and(|f| !f.is_empty() && !f.is_image()) {
            return PostValidation::rejected(candidate, ValidationFailure::NonImageFile, redirect_url);
        }

        PostValidation::valid(redirect_url)
    }

    /// Wrap a fetched page with navigation links and the trending list.
    pub async fn assemble_paged_view(
        &self,
        page: Page<Post>,
        title: impl Into<String>,
        base_link: &str,
    ) -> Result<PagedView, DomainError> {
        let next_link = page
            .has_next()
            .then(|| format!("{base_link}/{}", page.index + 1));
        let prev_link = page
            .has_previous()
            .then(|| format!("{base_link}/{}", page.index - 1));

        let trending_posts = self.trending_posts().await?;

        Ok(PagedView {
            title: title.into(),
            current_page: page.index + 1,
            total_pages: page.total_pages,
            posts: page.items,
            next_link,
            prev_link,
            trending_posts,
        })
    }

    async fn trending_posts(&self) -> Result<Vec<Post>, DomainError> {
        let page = self
            .posts
            .find_published_by_views(PageRequest::new(0, TRENDING_POSTS))
            .await?;

        Ok(page.items.into_iter().take(TRENDING_POSTS as usize).collect())
    }

    /// Persist an already incremented view count in the background.
    ///
    /// The worker bumps the stored counter rather than writing `post` back,
    /// so edits made in the meantime survive. Never fails: a job that cannot
    /// be queued is logged and dropped.
    pub async fn enqueue_view_increment(&self, post: Post) {
        let Some(post_id) = post.id else {
            tracing::warn!("Ignoring view count update for an unsaved post");
            return;
        };

        let payload = match serde_json::to_value(ViewIncrement { post_id }) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(post_id = %post_id, error = %e, "Dropping view count update");
                return;
            }
        };

        if let Err(e) = self.jobs.enqueue(Job::new(VIEW_INCREMENT_JOB, payload)).await {
            tracing::warn!(post_id = %post_id, error = %e, "Dropping view count update");
        }
    }
}

/// Worker side of [`PostService::enqueue_view_increment`].
pub fn view_increment_handler(posts: Arc<dyn PostRepository>) -> JobHandler {
    Box::new(move |job: Job| -> Pin<Box<dyn Future<Output = JobResult> + Send>> {
        let posts = posts.clone();
        Box::pin(async move {
            if job.job_type != VIEW_INCREMENT_JOB {
                return JobResult::Failed(format!("unexpected job type {}", job.job_type));
            }

            let ViewIncrement { post_id } = match serde_json::from_value(job.payload) {
                Ok(increment) => increment,
                Err(e) => return JobResult::Failed(format!("malformed payload: {e}")),
            };

            match posts.increment_views(post_id).await {
                Ok(views) => {
                    tracing::debug!(post_id = %post_id, views, "View count saved");
                    JobResult::Success
                }
                Err(e) => JobResult::Failed(e.to_string()),
            }
        })
    })
}
