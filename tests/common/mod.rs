#![allow(dead_code)]

use bitsa_portal::{
    AppConfig, FixedAppearance, MemoryStore, MockStorageService, Portal,
    backend::{
        BackendState, create_router,
        repository::{InMemoryRepository, RepositoryState},
        seed_admin,
    },
    config::AdminSeed,
    models::{LoginRequest, RegisterRequest, Session},
    storage::StorageState,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "admin@bitsa.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    /// API base, e.g. `http://127.0.0.1:4321/api`.
    pub address: String,
    pub repo: RepositoryState,
    pub storage: MockStorageService,
}

impl TestApp {
    /// A fresh client context with its own in-memory session and theme storage.
    pub fn portal(&self) -> Portal {
        Portal::new(
            self.address.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(FixedAppearance(false)),
        )
    }

    pub async fn admin_session(&self) -> Session {
        self.portal()
            .api
            .login(&LoginRequest {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .expect("admin login failed")
    }

    pub async fn register(&self, name: &str, email: &str) -> Session {
        self.portal()
            .api
            .register(&RegisterRequest {
                name: name.into(),
                email: email.into(),
                password: "member-pass".into(),
                course: None,
            })
            .await
            .expect("registration failed")
    }

    /// A portal already logged in with `session`.
    pub fn portal_as(&self, session: Session) -> Portal {
        let portal = self.portal();
        portal.session.login(session).expect("session persist failed");
        portal
    }
}

pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let mock = MockStorageService::new();
    let storage = Arc::new(mock.clone()) as StorageState;
    let config = AppConfig {
        password_cost: 4,
        ..AppConfig::default()
    };

    let seed = AdminSeed {
        email: ADMIN_EMAIL.into(),
        password: ADMIN_PASSWORD.into(),
    };
    seed_admin(&repo, &seed, config.password_cost)
        .await
        .expect("admin seed failed");

    let router = create_router(BackendState {
        repo: repo.clone(),
        storage,
        config,
    });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}/api", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        storage: mock,
    }
}
