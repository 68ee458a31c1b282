use std::sync::{PoisonError, RwLock};

use crate::error::PersistError;
use crate::models::{Session, SessionUser};
use crate::persist::{SESSION_KEY, StoreHandle};

/// SessionStore
///
/// Holds the one active session of a client context. Single-writer contract:
/// only `login` and `logout` change it; every page reads it.
///
/// Construction restores the persisted session synchronously, so the first
/// page built from a `Portal` already sees the right identity.
pub struct SessionStore {
    storage: StoreHandle,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// restore
    ///
    /// Reads the `userInfo` key. A missing key means logged out; an unreadable or
    /// corrupt value is logged and treated the same way.
    pub fn restore(storage: StoreHandle) -> Self {
        let current = match storage.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Discarding unreadable persisted session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {}", e);
                None
            }
        };

        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    /// Persists the session and makes it current.
    pub fn login(&self, session: Session) -> Result<(), PersistError> {
        let raw = serde_json::to_string(&session)?;
        self.storage.set(SESSION_KEY, &raw)?;
        tracing::debug!(user_id = %session.user.id, role = ?session.user.role, "session stored");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Clears both the persisted and the in-memory session.
    pub fn logout(&self) -> Result<(), PersistError> {
        // Memory is cleared even if the storage write fails.
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.remove(SESSION_KEY)
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.current().map(|s| s.user)
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Session::is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::persist::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn session(role: Role) -> Session {
        Session {
            token: "jwt-token".into(),
            user: SessionUser {
                id: "u1".into(),
                name: "Amina".into(),
                email: "amina@example.com".into(),
                role,
            },
        }
    }

    #[test]
    fn starts_logged_out_with_empty_storage() {
        let store = SessionStore::restore(Arc::new(MemoryStore::new()));
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(store.token().is_none());
    }

    #[test]
    fn login_survives_reload() {
        let storage = MemoryStore::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login(session(Role::Admin)).unwrap();

        let reloaded = SessionStore::restore(Arc::new(storage));
        assert!(reloaded.is_authenticated());
        assert!(reloaded.is_admin());
        assert_eq!(reloaded.token().as_deref(), Some("jwt-token"));
    }

    #[test]
    fn plain_user_is_not_admin_after_reload() {
        let storage = MemoryStore::new();
        SessionStore::restore(Arc::new(storage.clone()))
            .login(session(Role::User))
            .unwrap();

        let reloaded = SessionStore::restore(Arc::new(storage));
        assert!(reloaded.is_authenticated());
        assert!(!reloaded.is_admin());
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let storage = MemoryStore::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login(session(Role::User)).unwrap();
        store.logout().unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_storage_is_treated_as_logged_out() {
        let storage = MemoryStore::new();
        storage.set(SESSION_KEY, "{not json").unwrap();
        let store = SessionStore::restore(Arc::new(storage));
        assert!(!store.is_authenticated());
    }
}
