use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::backend::{BackendState, handlers};

/// Authenticated Router
///
/// Everything a signed-in member can do. Author-or-admin checks for editing
/// posts and deleting comments happen inside the handlers.
pub fn authenticated_routes() -> Router<BackendState> {
    Router::new()
        .route(
            "/auth/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // --- Blogs ---
        .route("/blogs", post(handlers::create_blog))
        .route(
            "/blogs/{id}",
            put(handlers::update_blog).delete(handlers::delete_blog),
        )
        .route("/blogs/{id}/like", put(handlers::like_blog))
        .route("/blogs/{id}/comments", post(handlers::add_blog_comment))
        .route(
            "/blogs/{id}/comments/{comment_id}",
            delete(handlers::delete_blog_comment),
        )
        // --- Events ---
        .route("/events/{id}/like", put(handlers::like_event))
        .route("/events/{id}/comments", post(handlers::add_event_comment))
        .route(
            "/events/{id}/comments/{comment_id}",
            delete(handlers::delete_event_comment),
        )
        // --- Notifications ---
        .route("/notifications", get(handlers::get_notifications))
        .route(
            "/notifications/read-all",
            put(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::mark_notification_read),
        )
}
