use axum::{
    Router,
    routing::{get, post},
};

use crate::backend::{BackendState, handlers};

/// Public Router
///
/// Anonymous reads plus the sign-in flow. The blog listing only ever returns
/// approved posts; pending ones are reachable through the admin router.
pub fn public_routes() -> Router<BackendState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/register", post(handlers::register_user))
        .route("/auth/login", post(handlers::login_user))
        .route("/blogs", get(handlers::get_blogs))
        .route("/blogs/{id}", get(handlers::get_blog))
        .route("/categories", get(handlers::get_categories))
        .route("/events", get(handlers::get_events))
        .route("/events/{id}", get(handlers::get_event))
        .route("/contacts", get(handlers::get_contacts))
        .route("/contacts/message", post(handlers::send_contact_message))
        .route("/gallery", get(handlers::get_gallery))
        // Active slides only, in display order.
        .route("/carousel", get(handlers::get_carousel))
}
