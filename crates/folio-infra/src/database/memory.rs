//! In-memory repositories - used when no database is configured.
//!
//! Note: Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Category, Page, PageRequest, Post, User};
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, CategoryRepository, PostRepository, UserRepository};

/// Posts kept in a HashMap behind an async RwLock.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn published_page<F>(&self, page: PageRequest, order: F) -> Page<Post>
    where
        F: Fn(&Post, &Post) -> Ordering,
    {
        let store = self.store.read().await;
        let mut posts: Vec<&Post> = store.values().filter(|p| p.published).collect();
        posts.sort_by(|a, b| order(a, b));

        let size = page.size.max(1);
        let total_pages = (posts.len() as u64).div_ceil(size);
        let items = posts
            .into_iter()
            .skip((page.index * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();

        Page::new(items, page.index, total_pages)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn save(&self, mut post: Post) -> Result<Post, RepoError> {
        if post.author_id.is_none() {
            return Err(RepoError::Constraint("post has no author".to_string()));
        }

        let now = Utc::now();
        let mut store = self.store.write().await;

        let id = match post.id {
            Some(id) => {
                let existing = store.get(&id).ok_or(RepoError::NotFound)?;
                post.created_at = post.created_at.or(existing.created_at);
                id
            }
            None => {
                let id = Uuid::new_v4();
                post.id = Some(id);
                post.created_at = Some(now);
                id
            }
        };
        post.updated_at = Some(now);

        store.insert(id, post.clone());
        Ok(post)
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.views = post.views.saturating_add(1);
        Ok(post.views)
    }

    async fn find_published_by_views(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        Ok(self
            .published_page(page, |a, b| {
                b.views.cmp(&a.views).then(b.created_at.cmp(&a.created_at))
            })
            .await)
    }

    async fn find_published_latest(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        Ok(self
            .published_page(page, |a, b| b.created_at.cmp(&a.created_at))
            .await)
    }
}

/// Categories kept in memory; filled through `insert`.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    store: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, category: Category) {
        self.store.write().await.insert(category.id, category);
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }
}

impl CategoryRepository for InMemoryCategoryRepository {}

/// Users kept in memory; filled through `insert`.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.store.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }
}

impl UserRepository for InMemoryUserRepository {}
