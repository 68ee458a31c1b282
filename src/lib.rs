use std::sync::Arc;

// --- Module Structure ---

// Client core: wire types, gateway and durable state.
pub mod config;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod models;
pub mod persist;
pub mod session;
pub mod theme;

// View-layer building blocks shared by every page.
pub mod form;
pub mod guard;
pub mod invalidation;
pub mod social;
pub mod view;

// Page controllers (public, account, admin).
pub mod pages;

// Local REST backend and its object storage.
pub mod backend;
pub mod storage;

// --- Public Re-exports ---

pub use config::{AppConfig, Env};
pub use error::{ApiError, ApiResult};
pub use gateway::{ApiClient, RequestBody, Upload};
pub use invalidation::{Invalidations, Mutation, ViewKey};
pub use persist::{FileStore, KeyValueStore, MemoryStore, StoreHandle};
pub use session::SessionStore;
pub use storage::{MockStorageService, S3StorageClient, StorageState};
pub use theme::{AppearanceProbe, FixedAppearance, ThemeStore};

/// Portal
///
/// The context every page is built from. Cloning is cheap and all clones share
/// one session, one theme and one invalidation set, so a login or a mutation
/// on one page is visible to the others.
#[derive(Clone)]
pub struct Portal {
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub theme: Arc<ThemeStore>,
    pub invalidations: Invalidations,
}

impl Portal {
    /// Restores session and theme from `storage` and points the gateway at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        storage: StoreHandle,
        appearance: Arc<dyn AppearanceProbe>,
    ) -> Self {
        Self {
            api: ApiClient::new(base_url),
            session: Arc::new(SessionStore::restore(storage.clone())),
            theme: Arc::new(ThemeStore::restore(storage, appearance)),
            invalidations: Invalidations::new(),
        }
    }

    /// Bearer token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Token for a call that needs one. Pages use it to refuse before sending.
    pub(crate) fn require_token(&self) -> Result<String, ApiError> {
        self.session.token().ok_or(ApiError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: Some("Please log in first.".to_string()),
        })
    }
}
