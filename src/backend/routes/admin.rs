use axum::{
    Router,
    routing::{get, post, put},
};

use crate::backend::{BackendState, handlers};

/// Admin Router
///
/// Moderation and content management. Writes to public resources (categories,
/// events, contacts, gallery, carousel) live here, sharing their paths with the
/// public reads.
pub fn admin_routes() -> Router<BackendState> {
    Router::new()
        .route("/admin/stats", get(handlers::get_admin_stats))
        .route("/admin/users", get(handlers::get_admin_users))
        .route(
            "/admin/users/{id}",
            put(handlers::update_user_status).delete(handlers::delete_user),
        )
        .route("/blogs/admin", get(handlers::get_admin_blogs))
        .route("/categories", post(handlers::create_category))
        .route(
            "/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/events", post(handlers::create_event))
        .route(
            "/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .route("/contacts", post(handlers::create_contact))
        .route(
            "/contacts/{id}",
            put(handlers::update_contact).delete(handlers::delete_contact),
        )
        .route("/gallery", post(handlers::create_gallery_item))
        .route(
            "/gallery/{id}",
            put(handlers::update_gallery_item).delete(handlers::delete_gallery_item),
        )
        .route("/carousel/admin", get(handlers::get_all_carousel))
        .route("/carousel", post(handlers::create_carousel_item))
        .route(
            "/carousel/{id}",
            put(handlers::update_carousel_item).delete(handlers::delete_carousel_item),
        )
}
