//! Post handlers: listings, reading and the author's save form.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::domain::{PageRequest, Post, UploadedFile};
use folio_core::ports::{BaseRepository, PostRepository};
use folio_shared::dto::SavePostRequest;

use crate::middleware::auth::Author;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const LATEST_LINK: &str = "/api/posts/page";
const TRENDING_LINK: &str = "/api/posts/trending/page";

/// GET /api/posts
pub async fn list_latest(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    latest(&state, 0).await
}

/// GET /api/posts/page/{index}
pub async fn latest_page(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    latest(&state, path.into_inner()).await
}

/// GET /api/posts/trending/page/{index}
pub async fn trending_page(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let request = PageRequest::new(path.into_inner(), state.posts_per_page);
    let page = state.posts.find_published_by_views(request).await?;

    let view = state
        .post_service
        .assemble_paged_view(page, "Trending Posts", TRENDING_LINK)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

async fn latest(state: &AppState, index: u64) -> AppResult<HttpResponse> {
    let request = PageRequest::new(index, state.posts_per_page);
    let page = state.posts.find_published_latest(request).await?;

    let view = state
        .post_service
        .assemble_paged_view(page, "Latest Posts", LATEST_LINK)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/posts/{id}
///
/// Counts the read; the new view count is saved in the background.
pub async fn read_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .filter(|p| p.published)
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))?
        .record_view();

    state.post_service.enqueue_view_increment(post.clone()).await;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
///
/// Creates a post, or updates it when the body carries an `id`.
pub async fn save_post(
    state: web::Data<AppState>,
    Author(identity): Author,
    body: web::Json<SavePostRequest>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let (candidate, category_id, upload) = submission(body.into_inner());

    let fallback_path = match candidate.id {
        Some(id) => format!("/api/posts/{}", id),
        None => "/api/posts".to_string(),
    };
    let validation = state
        .post_service
        .validate_post(&candidate, upload.as_ref(), &fallback_path);

    if !validation.success {
        tracing::debug!(
            user_id = %user.id,
            reason = ?validation.error,
            "Post submission rejected"
        );
        return Err(AppError::Validation {
            reason: validation
                .error
                .map(|e| e.to_string())
                .unwrap_or_default(),
            redirect_url: validation.redirect_url,
        });
    }

    let created = candidate.id.is_none();
    let saved = state
        .post_service
        .upsert_post(candidate, category_id, upload.as_ref(), &user)
        .await?;

    if created {
        Ok(HttpResponse::Created().json(saved))
    } else {
        Ok(HttpResponse::Ok().json(saved))
    }
}

/// Split a save request into the candidate post, its category and the upload.
fn submission(req: SavePostRequest) -> (Post, Option<Uuid>, Option<UploadedFile>) {
    let upload = req
        .cover_upload
        .map(|u| UploadedFile::new(u.filename, u.content_type, u.data));

    let candidate = Post {
        id: req.id,
        tags: req.tags.into_iter().collect(),
        cover_image: req.cover_image,
        published: req.published,
        featured: req.featured,
        ..Post::new(req.title, req.body)
    };

    (candidate, req.category_id, upload)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use folio_core::domain::{Category, User};
    use folio_core::ports::TokenService;
    use folio_infra::{InMemoryFileStore, JwtConfig, JwtTokenService};

    use super::*;
    use crate::config::{AppConfig, SeedConfig};
    use crate::handlers::configure_routes;
    use crate::middleware::auth::AUTHOR_ROLE;
    use crate::state::Repositories;

    struct Harness {
        state: AppState,
        tokens: Arc<dyn TokenService>,
        author: User,
        category: Category,
    }

    impl Harness {
        async fn new() -> Self {
            let author = User::new("Ada", "ada@example.com");
            let category = Category::new("Engineering");
            let config = AppConfig {
                posts_per_page: 5,
                seed: SeedConfig {
                    authors: vec![author.clone()],
                    categories: vec![category.clone()],
                },
                ..AppConfig::default()
            };

            let repositories = Repositories::in_memory(&config.seed).await;

            Self {
                state: AppState::assemble(repositories, Arc::new(InMemoryFileStore::new()), &config),
                tokens: Arc::new(JwtTokenService::new(JwtConfig::default())),
                author,
                category,
            }
        }

        fn routes(&self) -> impl FnOnce(&mut web::ServiceConfig) + 'static {
            let state = self.state.clone();
            let tokens = self.tokens.clone();
            move |cfg: &mut web::ServiceConfig| {
                cfg.app_data(web::Data::new(state))
                    .app_data(web::Data::new(tokens));
                configure_routes(cfg);
            }
        }

        fn bearer(&self, roles: &[&str]) -> String {
            let roles = roles.iter().map(|r| r.to_string()).collect();
            let token = self.tokens.generate_token(self.author.id, roles).unwrap();
            format!("Bearer {}", token)
        }

        async fn publish(&self, title: &str, views: i64) -> Post {
            self.state
                .posts
                .save(Post {
                    author_id: Some(self.author.id),
                    published: true,
                    views,
                    ..Post::new(title, "body")
                })
                .await
                .unwrap()
        }
    }

    #[actix_rt::test]
    async fn test_latest_listing_links_to_next_page() {
        let harness = Harness::new().await;
        for i in 0..7 {
            harness.publish(&format!("post {i}"), i).await;
        }
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["title"], "Latest Posts");
        assert_eq!(body["current_page"], 1);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["posts"].as_array().unwrap().len(), 5);
        assert_eq!(body["next_link"], "/api/posts/page/1");
        assert!(body.get("prev_link").is_none());
        assert_eq!(body["trending_posts"].as_array().unwrap().len(), 4);
    }

    #[actix_rt::test]
    async fn test_trending_last_page_links_back() {
        let harness = Harness::new().await;
        for views in [5, 80, 13, 2, 40, 21] {
            harness.publish(&format!("{views} views"), views).await;
        }
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::get()
            .uri("/api/posts/trending/page/1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["current_page"], 2);
        assert_eq!(body["prev_link"], "/api/posts/trending/page/0");
        assert!(body.get("next_link").is_none());
        assert_eq!(body["posts"][0]["views"], 2);

        let trending: Vec<i64> = body["trending_posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["views"].as_i64().unwrap())
            .collect();
        assert_eq!(trending, vec![80, 40, 21, 13]);
    }

    #[actix_rt::test]
    async fn test_read_post_counts_view_in_background() {
        let harness = Harness::new().await;
        let post = harness.publish("Hello", 0).await;
        let id = post.id.unwrap();
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["views"], 1);

        let mut stored = 0;
        for _ in 0..100 {
            stored = harness.state.posts.find_by_id(id).await.unwrap().unwrap().views;
            if stored == 1 {
                break;
            }
            actix_rt::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stored, 1);
    }

    #[actix_rt::test]
    async fn test_read_draft_is_not_found() {
        let harness = Harness::new().await;
        let draft = harness
            .state
            .posts
            .save(Post {
                author_id: Some(harness.author.id),
                ..Post::new("Draft", "body")
            })
            .await
            .unwrap();
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", draft.id.unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_save_requires_token() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "Hi", "body": "there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_save_requires_author_role() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&["reader"])))
            .set_json(json!({ "title": "Hi", "body": "there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_create_post_as_author() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&[AUTHOR_ROLE])))
            .set_json(json!({
                "title": "Hi",
                "body": "there",
                "tags": ["intro"],
                "category_id": harness.category.id,
                "published": true,
                "cover_upload": {
                    "filename": "cover.png",
                    "content_type": "image/png",
                    "data": [137, 80, 78, 71]
                }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        let id = body["post"]["id"].as_str().unwrap();
        assert_eq!(body["status"], "Post Saved Successfully");
        assert_eq!(body["redirect_url"], format!("/api/posts/{}", id));
        assert_eq!(body["post"]["author_id"], harness.author.id.to_string());
        assert_eq!(body["post"]["category_id"], harness.category.id.to_string());
        assert!(body["post"]["cover_image"].as_str().unwrap().ends_with(".png"));

        let req = test::TestRequest::get()
            .uri(body["redirect_url"].as_str().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let read: Value = test::read_body_json(resp).await;
        assert_eq!(read["id"], id);
        assert_eq!(read["title"], "Hi");
    }

    #[actix_rt::test]
    async fn test_unseeded_author_is_unauthorized() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;
        let stranger = harness
            .tokens
            .generate_token(Uuid::new_v4(), vec![AUTHOR_ROLE.to_string()])
            .unwrap();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", stranger)))
            .set_json(json!({ "title": "Hi", "body": "there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_update_keeps_author() {
        let harness = Harness::new().await;
        let post = harness.publish("Before", 9).await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&[AUTHOR_ROLE])))
            .set_json(json!({
                "id": post.id,
                "title": "After",
                "body": "edited",
                "published": true
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "Post Updated Successfully");
        assert_eq!(body["post"]["title"], "After");
        assert_eq!(body["post"]["views"], 9);
        assert_eq!(body["post"]["author_id"], harness.author.id.to_string());
    }

    #[actix_rt::test]
    async fn test_update_unknown_post_is_not_found() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&[AUTHOR_ROLE])))
            .set_json(json!({ "id": Uuid::new_v4(), "title": "Hi", "body": "there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_blank_title_is_rejected() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&[AUTHOR_ROLE])))
            .set_json(json!({ "title": "  ", "body": "there" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "missing required fields");
        assert_eq!(body["redirect_url"], "/api/posts/edit");
    }

    #[actix_rt::test]
    async fn test_pdf_cover_is_rejected() {
        let harness = Harness::new().await;
        let post = harness.publish("Existing", 0).await;
        let id = post.id.unwrap();
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, harness.bearer(&[AUTHOR_ROLE])))
            .set_json(json!({
                "id": id,
                "title": "Existing",
                "body": "body",
                "cover_image": "new.pdf",
                "cover_upload": {
                    "filename": "new.pdf",
                    "content_type": "application/pdf",
                    "data": [37, 80, 68, 70]
                }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "non-image file rejected");
        assert_eq!(body["redirect_url"], format!("/api/posts/{}/edit", id));
    }

    #[actix_rt::test]
    async fn test_health_reports_queue() {
        let harness = Harness::new().await;
        let app = test::init_service(App::new().configure(harness.routes())).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["pending_jobs"], 0);
    }
}
