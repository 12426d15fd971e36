//! Client-held session state: the bearer token and user record issued at login.
//!
//! The browser front end kept these in ambient storage; here the session is an explicit
//! object injected into whatever needs a credential, with login (init/mutation) and logout
//! (teardown) as named operations. State lives behind a small key-value seam so embedders
//! can substitute their own persistence.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Minimal string key-value storage seam.
///
/// Implementations only need point reads and writes; the session layer handles
/// serialization of structured values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory key-value store, the default for native embedding and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// User record issued by the backend at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub role: String,
}

/// Explicit session handle. Cloning shares the underlying store, so one login is
/// visible to every component holding a clone.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fresh session backed by an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Store the credential and user record issued at login.
    pub fn login(&self, token: impl Into<String>, user: &SessionUser) {
        self.store.set(TOKEN_KEY, token.into());
        if let Ok(encoded) = serde_json::to_string(user) {
            self.store.set(USER_KEY, encoded);
        }
    }

    /// Remove all session state.
    pub fn logout(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }

    /// Stored user record. A corrupt record reads back as `None`.
    pub fn user(&self) -> Option<SessionUser> {
        let raw = self.store.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Presence of the token defines "authenticated".
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            username: "ada".to_string(),
            role: "author".to_string(),
        }
    }

    #[test]
    fn login_stores_token_and_user() {
        let session = SessionStore::in_memory();
        assert!(!session.is_authenticated());

        session.login("tok-123", &user());

        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(session.user(), Some(user()));
    }

    #[test]
    fn logout_clears_everything() {
        let session = SessionStore::in_memory();
        session.login("tok-123", &user());

        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
    }

    #[test]
    fn corrupt_user_record_reads_as_none() {
        let store = Arc::new(MemoryStore::default());
        store.set(USER_KEY, "{not json".to_string());
        store.set(TOKEN_KEY, "tok-123".to_string());

        let session = SessionStore::new(store);

        assert_eq!(session.user(), None);
        // The token is independent of the user record
        assert!(session.is_authenticated());
    }

    #[test]
    fn clones_share_state() {
        let session = SessionStore::in_memory();
        let other = session.clone();

        session.login("tok-123", &user());
        assert!(other.is_authenticated());

        other.logout();
        assert!(!session.is_authenticated());
    }
}
