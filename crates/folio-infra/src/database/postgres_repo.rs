//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select,
};
use uuid::Uuid;

use folio_core::domain::{Page, PageRequest, Post};
use folio_core::error::RepoError;
use folio_core::ports::{CategoryRepository, PostRepository, UserRepository};

use super::entity::category::Entity as CategoryEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::Entity as UserEntity;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

impl UserRepository for PostgresUserRepository {}

impl CategoryRepository for PostgresCategoryRepository {}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let author_id = post
            .author_id
            .ok_or_else(|| RepoError::Constraint("post has no author".to_string()))?;
        let tags = serde_json::to_value(&post.tags).map_err(|e| RepoError::Query(e.to_string()))?;
        let now = Utc::now();

        let mut model = post::ActiveModel {
            id: NotSet,
            title: Set(post.title),
            body: Set(post.body),
            tags: Set(tags),
            category_id: Set(post.category_id),
            author_id: Set(author_id),
            cover_image: Set(post.cover_image),
            published: Set(post.published),
            featured: Set(post.featured),
            views: Set(post.views),
            created_at: NotSet,
            updated_at: Set(now.into()),
        };

        let saved = match post.id {
            Some(id) => {
                model.id = Set(id);
                if let Some(created_at) = post.created_at {
                    model.created_at = Set(created_at.into());
                }
                model.update(&self.db).await.map_err(map_db_err)?
            }
            None => {
                model.id = Set(Uuid::new_v4());
                model.created_at = Set(now.into());
                model.insert(&self.db).await.map_err(map_db_err)?
            }
        };

        tracing::debug!(post_id = %saved.id, views = saved.views, "Post saved");
        Ok(saved.into())
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError> {
        // Single UPDATE so concurrent edits and reads never overwrite each other.
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let counted = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        counted.map(|model| model.views).ok_or(RepoError::NotFound)
    }

    async fn find_published_by_views(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(post::Column::Published.eq(true))
            .order_by_desc(post::Column::Views)
            .order_by_desc(post::Column::CreatedAt);

        fetch_page(&self.db, query, page).await
    }

    async fn find_published_latest(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(post::Column::Published.eq(true))
            .order_by_desc(post::Column::CreatedAt);

        fetch_page(&self.db, query, page).await
    }
}

async fn fetch_page(
    db: &DbConn,
    query: Select<PostEntity>,
    page: PageRequest,
) -> Result<Page<Post>, RepoError> {
    let paginator = query.paginate(db, page.size.max(1));
    let total_pages = paginator.num_pages().await.map_err(map_db_err)?;
    let models = paginator.fetch_page(page.index).await.map_err(map_db_err)?;

    Ok(Page::new(
        models.into_iter().map(Into::into).collect(),
        page.index,
        total_pages,
    ))
}
