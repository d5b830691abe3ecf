//! Session storage.
//!
//! Holds the bearer token and a minimal identity for the signed-in user. The
//! store is a cheap cloneable handle: every clone sees the same session, and
//! the executor, controllers and CLI share one instance explicitly.

mod backend;

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use backend::{FileBackend, KeyringBackend, MemoryBackend, SessionBackend};

/// Errors raised by session backends.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The local data directory could not be determined.
    #[error("Could not determine local data directory")]
    NoDataDir,

    /// Reading or writing the session file failed.
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session could not be encoded or decoded.
    #[error("Session format error: {0}")]
    Format(#[from] serde_json::Error),

    /// OS keyring access failed.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Identity summary kept alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: String,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Token and user of the current session.
///
/// Both are present or both are absent; the fields are private so the pair
/// can only be set together.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    /// An authenticated session.
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Drop half-populated sessions read from storage.
    fn normalized(self) -> Self {
        if self.is_authenticated() {
            self
        } else {
            Self::default()
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Process-wide session handle.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    backend: Arc<dyn SessionBackend>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.get())
            .finish_non_exhaustive()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionStore {
    /// A store that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            backend: Arc::new(MemoryBackend::default()),
        }
    }

    /// Create a store and restore any session the backend persisted.
    ///
    /// Unreadable storage is logged and treated as "signed out".
    pub fn load(backend: Arc<dyn SessionBackend>) -> Self {
        let session = match backend.load() {
            Ok(Some(session)) => session.normalized(),
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Failed to restore session, starting signed out: {}", e);
                Session::default()
            }
        };
        debug!(authenticated = session.is_authenticated(), "Session restored");

        Self {
            state: Arc::new(RwLock::new(session)),
            backend,
        }
    }

    /// Snapshot of the current session.
    pub fn get(&self) -> Session {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.get().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_authenticated()
    }

    /// Replace the session with a freshly authenticated one.
    pub fn set(&self, token: impl Into<String>, user: SessionUser) {
        let session = Session::new(token, user);
        if let Err(e) = self.backend.save(&session) {
            warn!("Failed to persist session: {}", e);
        }
        info!(user_id = %session.user().map(|u| u.id.as_str()).unwrap_or_default(), "Session established");
        self.replace(session);
    }

    /// Sign out. Clearing an empty session does nothing.
    pub fn clear(&self) {
        if !self.get().is_authenticated() {
            return;
        }
        if let Err(e) = self.backend.clear() {
            warn!("Failed to remove persisted session: {}", e);
        }
        self.replace(Session::default());
        info!("Session cleared");
    }

    fn replace(&self, session: Session) {
        match self.state.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> SessionUser {
        SessionUser {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_new_store_is_signed_out() {
        let store = SessionStore::in_memory();
        let session = store.get();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::in_memory();
        store.set("tok-123", test_user());

        let session = store.get();
        assert_eq!(session.token(), Some("tok-123"));
        assert_eq!(session.user().map(|u| u.id.as_str()), Some("u-1"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set("tok", test_user());
        assert!(other.is_authenticated());
        other.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_removes_token_and_user() {
        let store = SessionStore::in_memory();
        store.set("tok", test_user());
        store.clear();

        let session = store.get();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.clear();
        store.clear();
        assert_eq!(store.get(), Session::default());
    }

    #[test]
    fn test_load_restores_persisted_session() {
        let backend = Arc::new(MemoryBackend::default());
        SessionStore::load(backend.clone()).set("tok", test_user());

        let restored = SessionStore::load(backend);
        assert_eq!(restored.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_half_populated_session_is_dropped() {
        let half: Session = serde_json::from_str(r#"{"token":"tok","user":null}"#).unwrap();
        assert!(!half.is_authenticated());
        assert_eq!(half.normalized(), Session::default());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("super-secret", test_user());
        let output = format!("{:?}", session);
        assert!(!output.contains("super-secret"));
        assert!(output.contains("redacted"));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = test_user();
        assert_eq!(user.display_name(), "Ada Lovelace");
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.display_name(), "ada@example.com");
    }
}
