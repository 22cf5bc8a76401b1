use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Page, PageRequest, Post, User};
use crate::error::RepoError;

/// Lookup shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository.
pub trait UserRepository: BaseRepository<User, Uuid> {}

/// Category repository.
pub trait CategoryRepository: BaseRepository<Category, Uuid> {}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert a post without an id, update one that has an id.
    /// Returns the stored post, id and timestamps filled in.
    async fn save(&self, post: Post) -> Result<Post, RepoError>;

    /// Add one read to the stored counter and return the new count.
    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError>;

    /// Published posts, most viewed first.
    async fn find_published_by_views(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// Published posts, newest first.
    async fn find_published_latest(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;
}
