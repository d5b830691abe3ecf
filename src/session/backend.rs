//! Persistent session backends.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, trace};

use super::{Session, SessionError};

/// The keyring service name for TrackMyBugs sessions.
const KEYRING_SERVICE: &str = "trackmybugs";

/// File name of the on-disk session.
const SESSION_FILE: &str = "session.json";

/// Where a [`SessionStore`](super::SessionStore) persists its state.
pub trait SessionBackend: Send + Sync {
    /// Read the persisted session, if there is one.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Persist `session`, replacing any previous one.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the persisted session. Removing nothing is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<Session>>,
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.saved.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = None;
        }
        Ok(())
    }
}

/// Stores the session as JSON in a file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Use an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `session.json` in the platform local data directory.
    ///
    /// - Linux: `~/.local/share/trackmybugs/<profile>/session.json`
    /// - macOS: `~/Library/Application Support/trackmybugs/<profile>/session.json`
    pub fn for_profile(profile: &str) -> Result<Self, SessionError> {
        let base = dirs::data_local_dir().ok_or(SessionError::NoDataDir)?;
        Ok(Self::new(
            base.join("trackmybugs").join(profile).join(SESSION_FILE),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(session) => {
                trace!("Loaded session from {:?}", self.path);
                Ok(Some(session))
            }
            Err(e) => {
                debug!("Discarding corrupt session file {:?}: {}", self.path, e);
                let _ = fs::remove_file(&self.path);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(session)?;
        fs::write(&self.path, content)?;
        trace!("Saved session to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stores the serialized session in the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    profile: String,
}

impl KeyringBackend {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, SessionError> {
        keyring::Entry::new(KEYRING_SERVICE, &self.profile)
            .map_err(|e| SessionError::Keyring(format!("failed to access keyring: {}", e)))
    }
}

impl SessionBackend for KeyringBackend {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        read_secret(self.entry()?.get_password())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let secret = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&secret)
            .map_err(|e| SessionError::Keyring(format!("failed to store session: {}", e)))
    }

    fn clear(&self) -> Result<(), SessionError> {
        deleted(self.entry()?.delete_password())
    }
}

/// A missing entry means nobody has signed in under this profile yet.
fn read_secret(result: keyring::Result<String>) -> Result<Option<Session>, SessionError> {
    match result {
        Ok(secret) => Ok(Some(serde_json::from_str(&secret)?)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(SessionError::Keyring(format!(
            "failed to retrieve session: {}",
            e
        ))),
    }
}

fn deleted(result: keyring::Result<()>) -> Result<(), SessionError> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(SessionError::Keyring(format!(
            "failed to delete session: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, SessionUser};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_session() -> Session {
        Session::new(
            "tok-file",
            SessionUser {
                id: "u-7".to_string(),
                email: "grace@example.com".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                role: "user".to_string(),
            },
        )
    }

    #[test]
    fn test_file_backend_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("session.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_save_and_load() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("session.json"));

        backend.save(&test_session()).unwrap();
        let loaded = backend.load().unwrap().unwrap();

        assert_eq!(loaded, test_session());
    }

    #[test]
    fn test_file_backend_clear_twice() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("session.json"));
        backend.save(&test_session()).unwrap();

        backend.clear().unwrap();
        backend.clear().unwrap();
        assert!(!backend.path().exists());
    }

    #[test]
    fn test_file_backend_discards_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let backend = FileBackend::new(&path);
        assert!(backend.load().unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_store_survives_reload_with_file_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(Arc::new(FileBackend::new(&path)));
        store.set("tok-file", test_session().user().cloned().unwrap());

        let reloaded = SessionStore::load(Arc::new(FileBackend::new(&path)));
        assert_eq!(reloaded.get(), test_session());

        reloaded.clear();
        assert!(!path.exists());
        assert!(!SessionStore::load(Arc::new(FileBackend::new(&path))).is_authenticated());
    }

    #[test]
    fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::default();
        backend.save(&test_session()).unwrap();
        assert!(backend.load().unwrap().is_some());
        backend.clear().unwrap();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn test_keyring_missing_entry_is_none() {
        assert!(read_secret(Err(keyring::Error::NoEntry)).unwrap().is_none());
    }

    #[test]
    fn test_keyring_secret_decodes_session() {
        let secret = serde_json::to_string(&test_session()).unwrap();
        assert_eq!(read_secret(Ok(secret)).unwrap(), Some(test_session()));
        assert!(read_secret(Ok("not json".to_string())).is_err());
    }

    #[test]
    fn test_keyring_platform_errors_are_reported() {
        let err = read_secret(Err(keyring::Error::Invalid(
            "service".to_string(),
            "empty".to_string(),
        )))
        .unwrap_err();
        assert!(matches!(err, SessionError::Keyring(msg) if msg.contains("retrieve")));

        let err = deleted(Err(keyring::Error::Invalid(
            "user".to_string(),
            "empty".to_string(),
        )))
        .unwrap_err();
        assert!(matches!(err, SessionError::Keyring(msg) if msg.contains("delete")));
    }

    #[test]
    fn test_keyring_clear_of_absent_entry_is_ok() {
        assert!(deleted(Err(keyring::Error::NoEntry)).is_ok());
        assert!(deleted(Ok(())).is_ok());
    }

    #[test]
    #[ignore = "needs an OS keychain"]
    fn test_keyring_backend_roundtrip() {
        let backend = KeyringBackend::new("trackmybugs-test");
        backend.save(&test_session()).unwrap();
        assert_eq!(backend.load().unwrap(), Some(test_session()));

        backend.clear().unwrap();
        backend.clear().unwrap();
        assert!(backend.load().unwrap().is_none());
    }
}
