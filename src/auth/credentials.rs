//! Durable storage for the signed-in identity.
//!
//! The session file holds only the user id and username. The password the
//! chat API wants in request bodies lives in the system keyring, keyed by
//! username, and is read back only when a request needs it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::core::config::io::write_atomically;
use crate::core::constants::KEYRING_SERVICE;
use crate::core::keyring::{delete_secret, read_secret, write_secret, KeyringAccessError};
use crate::core::session::{Credentials, Session};

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug)]
pub enum CredentialError {
    Io { path: PathBuf, source: std::io::Error },
    Keyring(KeyringAccessError),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Io { path, source } => {
                write!(f, "Failed to access session file {}: {source}", path.display())
            }
            CredentialError::Keyring(err) => write!(f, "Failed to access keyring: {err}"),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::Io { source, .. } => Some(source),
            CredentialError::Keyring(err) => Some(err),
        }
    }
}

impl From<KeyringAccessError> for CredentialError {
    fn from(err: KeyringAccessError) -> Self {
        CredentialError::Keyring(err)
    }
}

pub trait CredentialStore: Send + Sync {
    /// The persisted session, if any. Unreadable state counts as signed out.
    fn load(&self) -> Result<Option<Session>, CredentialError>;

    /// The stored secret for `session`, if the backend still has it.
    fn secret(&self, session: &Session) -> Result<Option<String>, CredentialError>;

    fn save(&self, session: &Session, password: &str) -> Result<(), CredentialError>;

    /// Forget the session and its secret. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CredentialError>;

    fn credentials(&self, session: &Session) -> Result<Option<Credentials>, CredentialError> {
        Ok(self
            .secret(session)?
            .map(|password| Credentials::new(session.username.clone(), password)))
    }
}

/// `session.json` in the config directory plus one keyring entry per user.
pub struct FileCredentialStore {
    path: PathBuf,
    use_keyring: bool,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_keyring: true,
        }
    }

    /// A store that never touches the keyring; secrets are not retained.
    pub fn without_keyring(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_keyring: false,
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Session>, CredentialError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn secret(&self, session: &Session) -> Result<Option<String>, CredentialError> {
        if !self.use_keyring {
            return Ok(None);
        }
        Ok(read_secret(KEYRING_SERVICE, &session.username)?)
    }

    fn save(&self, session: &Session, password: &str) -> Result<(), CredentialError> {
        if self.use_keyring {
            write_secret(KEYRING_SERVICE, &session.username, password)?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|err| self.io_error(std::io::Error::other(err)))?;
        write_atomically(&self.path, &json).map_err(|err| self.io_error(err))?;
        debug!(username = %session.username, "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        if let Some(session) = self.load()? {
            if self.use_keyring {
                delete_secret(KEYRING_SERVICE, &session.username)?;
            }
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// Process-local store; nothing outlives the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    state: Mutex<Option<(Session, String)>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session, password: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(Some((session, password.into()))),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Option<(Session, String)>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Session>, CredentialError> {
        Ok(self.state().as_ref().map(|(session, _)| session.clone()))
    }

    fn secret(&self, session: &Session) -> Result<Option<String>, CredentialError> {
        Ok(self
            .state()
            .as_ref()
            .filter(|(stored, _)| stored.username == session.username)
            .map(|(_, password)| password.clone()))
    }

    fn save(&self, session: &Session, password: &str) -> Result<(), CredentialError> {
        *self.state() = Some((session.clone(), password.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.state() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            user_id: 17,
            username: "ada".into(),
        }
    }

    #[test]
    fn session_file_never_contains_the_password() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::without_keyring(dir.path().join(SESSION_FILE_NAME));

        store.save(&session(), "hunter2").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"username\": \"ada\""));
        assert!(!raw.contains("hunter2"));
        assert_eq!(store.load().unwrap(), Some(session()));
        assert_eq!(store.credentials(&session()).unwrap(), None);
    }

    #[test]
    fn missing_and_corrupt_files_mean_signed_out() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::without_keyring(dir.path().join(SESSION_FILE_NAME));
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), "{\"id\": NaN").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn clear_removes_file_and_tolerates_repeat() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::without_keyring(dir.path().join(SESSION_FILE_NAME));
        store.save(&session(), "pw").unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn memory_store_round_trips_credentials() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&session(), "pw").unwrap();
        let credentials = store.credentials(&session()).unwrap().unwrap();
        assert_eq!(credentials, Credentials::new("ada", "pw"));

        let other = Session {
            user_id: 2,
            username: "grace".into(),
        };
        assert_eq!(store.secret(&other).unwrap(), None);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
