use std::collections::BTreeMap;

use folio_core::domain::{Category, PageRequest, Post};
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, PostRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use crate::database::entity::{category, post};
use crate::database::postgres_repo::{PostgresCategoryRepository, PostgresPostRepository};

fn post_model(id: Uuid, views: i64) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        body: "Content".to_owned(),
        tags: serde_json::json!(["rust", "sea-orm"]),
        category_id: None,
        author_id: Uuid::new_v4(),
        cover_image: Some("cover.png".to_owned()),
        published: true,
        featured: false,
        views,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, 3)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, Some(post_id));
    assert_eq!(post.title, "Test Post");
    assert!(post.tags.contains("rust"));
    assert_eq!(post.cover_image.as_deref(), Some("cover.png"));
}

#[tokio::test]
async fn test_find_category_by_id() {
    let category_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![category::Model {
            id: category_id,
            name: "Rust".to_owned(),
            description: None,
        }]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    let result: Option<Category> = repo.find_by_id(category_id).await.unwrap();

    assert_eq!(result.unwrap().name, "Rust");
}

#[tokio::test]
async fn test_save_new_post_inserts() {
    let stored_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(stored_id, 0)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let candidate = Post {
        author_id: Some(Uuid::new_v4()),
        ..Post::new("Test Post", "Content")
    };

    let saved = repo.save(candidate).await.unwrap();

    assert_eq!(saved.id, Some(stored_id));
    assert!(saved.created_at.is_some());
}

#[tokio::test]
async fn test_save_without_author_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresPostRepository::new(db);

    let result = repo.save(Post::new("Test Post", "Content")).await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn test_increment_views_updates_counter_in_place() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![post_model(post_id, 8)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert_eq!(repo.increment_views(post_id).await.unwrap(), 8);

    let log = repo.db.into_transaction_log();
    assert_eq!(log.len(), 2);
    assert!(log[0].statements()[0].sql.starts_with(r#"UPDATE "posts""#));
}

#[tokio::test]
async fn test_increment_views_unknown_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo.increment_views(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_published_by_views_counts_pages() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(5)))])]])
        .append_query_results([vec![
            post_model(Uuid::new_v4(), 90),
            post_model(Uuid::new_v4(), 40),
            post_model(Uuid::new_v4(), 12),
            post_model(Uuid::new_v4(), 8),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .find_published_by_views(PageRequest::new(0, 4))
        .await
        .unwrap();

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.index, 0);
    assert_eq!(
        page.items.iter().map(|p| p.views).collect::<Vec<_>>(),
        vec![90, 40, 12, 8]
    );
}
