//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::PostService;
use folio_core::error::StorageError;
use folio_core::ports::{CategoryRepository, FileStore, JobQueue, PostRepository, UserRepository};
use folio_core::services::view_increment_handler;
use folio_infra::database::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository,
};
use folio_infra::{InMemoryFileStore, InMemoryJobQueue, LocalFileStore};

#[cfg(feature = "postgres")]
use folio_infra::database::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::{AppConfig, SeedConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobQueue>,
    pub posts_per_page: u64,
}

/// Repository set the state is built from.
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// In-memory repositories holding the seeded authors and categories.
    pub async fn in_memory(seed: &SeedConfig) -> Self {
        let users = InMemoryUserRepository::new();
        for author in &seed.authors {
            tracing::info!(user_id = %author.id, email = %author.email, "Seeded author");
            users.insert(author.clone()).await;
        }

        let categories = InMemoryCategoryRepository::new();
        for category in &seed.categories {
            tracing::info!(category_id = %category.id, name = %category.name, "Seeded category");
            categories.insert(category.clone()).await;
        }

        if seed.authors.is_empty() {
            tracing::warn!("No SEED_AUTHORS configured. Post submissions will be rejected.");
        }

        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            categories: Arc::new(categories),
            users: Arc::new(users),
        }
    }

    /// PostgreSQL when configured and reachable, in-memory otherwise.
    async fn from_config(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            let Some(db_config) = config.database.as_ref() else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                return Self::in_memory(&config.seed).await;
            };

            match folio_infra::database::connect(db_config).await {
                Ok(conn) => Self {
                    posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                    categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                    users: Arc::new(PostgresUserRepository::new(conn)),
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(&config.seed).await
                }
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Self::in_memory(&config.seed).await
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let repositories = Repositories::from_config(config).await;

        let files: Arc<dyn FileStore> = match &config.upload_dir {
            Some(dir) => Arc::new(LocalFileStore::new(dir.clone()).await?),
            None => {
                tracing::warn!("UPLOAD_DIR not set. Cover images are kept in memory.");
                Arc::new(InMemoryFileStore::new())
            }
        };

        let state = Self::assemble(repositories, files, config);
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire the service and start the background workers.
    pub fn assemble(
        repositories: Repositories,
        files: Arc<dyn FileStore>,
        config: &AppConfig,
    ) -> Self {
        let queue = InMemoryJobQueue::new(config.jobs.clone());
        queue.start_workers(view_increment_handler(repositories.posts.clone()));
        let jobs: Arc<dyn JobQueue> = Arc::new(queue);

        let post_service = Arc::new(PostService::new(
            repositories.posts.clone(),
            repositories.categories,
            files,
            jobs.clone(),
            config.post_service.clone(),
        ));

        Self {
            post_service,
            posts: repositories.posts,
            users: repositories.users,
            jobs,
            posts_per_page: config.posts_per_page,
        }
    }
}
