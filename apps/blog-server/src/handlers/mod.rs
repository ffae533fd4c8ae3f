//! HTTP handlers and route configuration.

mod context;
mod health;
mod posts;
mod share;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::json_error_handler;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope(context::API_PREFIX)
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Post list
                .route("/posts", web::get().to(posts::post_list))
                .route("/tags/{tag_slug}/posts", web::get().to(posts::post_list_by_tag))
                // Post detail and comments
                .service(
                    web::resource("/posts/{year}/{month}/{day}/{slug}")
                        .route(web::get().to(posts::post_detail))
                        .route(web::post().to(posts::add_comment)),
                )
                // Share by email
                .service(
                    web::resource("/posts/{post_id}/share")
                        .route(web::get().to(share::share_form))
                        .route(web::post().to(share::share_post)),
                ),
        );
}
