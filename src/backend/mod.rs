//! Local REST backend serving the same API the client talks to.

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod repository;
pub mod routes;

use crate::config::{AdminSeed, AppConfig};
use crate::models::Role;
use crate::storage::StorageState;
use auth::{AdminUser, AuthUser};
use error::BackendError;
use repository::{NewUser, RepositoryState};
use routes::{admin, authenticated, public};

/// BackendState
///
/// Shared by every handler: persistence, object storage and configuration.
#[derive(Clone)]
pub struct BackendState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
}

impl FromRef<BackendState> for RepositoryState {
    fn from_ref(state: &BackendState) -> RepositoryState {
        state.repo.clone()
    }
}

impl FromRef<BackendState> for StorageState {
    fn from_ref(state: &BackendState) -> StorageState {
        state.storage.clone()
    }
}

impl FromRef<BackendState> for AppConfig {
    fn from_ref(state: &BackendState) -> AppConfig {
        state.config.clone()
    }
}

/// Rejects requests without a valid bearer token before routing reaches a handler.
async fn auth_middleware(_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

async fn admin_middleware(_admin: AdminUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Mounts all routes under `/api` and wraps them in the request-id, tracing
/// and CORS layers.
pub fn create_router(state: BackendState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_middleware,
            )),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Puts the request id on the span so every log line of a request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

/// seed_admin
///
/// Creates the configured admin account unless that email is already registered.
pub async fn seed_admin(
    repo: &RepositoryState,
    seed: &AdminSeed,
    password_cost: u32,
) -> Result<(), BackendError> {
    if repo.find_user_by_email(&seed.email).await.is_some() {
        tracing::debug!(email = %seed.email, "admin already present");
        return Ok(());
    }
    let password_hash = bcrypt::hash(&seed.password, password_cost)?;
    let created = repo
        .create_user(NewUser {
            name: "Administrator".to_string(),
            email: seed.email.clone(),
            password_hash,
            role: Role::Admin,
            course: None,
        })
        .await;
    if let Some(admin) = created {
        tracing::info!(user_id = %admin.id, "admin account seeded");
    }
    Ok(())
}
