//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_latest))
                    .route("", web::post().to(posts::save_post))
                    .route("/page/{index}", web::get().to(posts::latest_page))
                    .route(
                        "/trending/page/{index}",
                        web::get().to(posts::trending_page),
                    )
                    .route("/{id}", web::get().to(posts::read_post)),
            ),
    );
}
