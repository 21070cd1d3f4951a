//! Session state and its persistence.
//!
//! A session is a pair of entries: the serialized user object and the raw
//! bearer token. Persistence sits behind [`SessionStore`] so the backing
//! store can be swapped (file for the CLI, memory for tests).

use crate::error::BlogApiError;
use crate::models::User;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Client-held record of the authenticated user and bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }
}

/// Persistence interface for the session. `load` is read once at startup;
/// a corrupt or partial entry is treated as no session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session) -> Result<(), BlogApiError>;
    fn clear(&self);
}

// ==================== Хранилище в памяти ====================

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<Session> {
        self.inner.lock().ok()?.clone()
    }

    fn save(&self, session: &Session) -> Result<(), BlogApiError> {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = None;
        }
    }
}

// ==================== Файловое хранилище ====================

const USER_FILE: &str = "auth_user.json";
const TOKEN_FILE: &str = "auth_token";

/// Two files in a directory: the user entry and the token entry. Both must
/// be present for a session to load.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Option<Session> {
        let user_json = fs::read_to_string(self.user_path()).ok()?;
        let token = fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return None;
        }

        let user: User = serde_json::from_str(&user_json).ok()?;
        Some(Session { user, token })
    }

    fn save(&self, session: &Session) -> Result<(), BlogApiError> {
        fs::create_dir_all(&self.dir)?;

        fs::write(self.user_path(), serde_json::to_string(&session.user)?)?;
        fs::write(self.token_path(), &session.token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for path in [self.user_path(), self.token_path()] {
                let mut perms = fs::metadata(&path)?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&path, perms)?;
            }
        }

        Ok(())
    }

    fn clear(&self) {
        // Mirrors localStorage.removeItem: absence is not an error.
        let _ = fs::remove_file(self.user_path());
        let _ = fs::remove_file(self.token_path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_session(role: Role) -> Session {
        Session {
            user: User {
                id: "u1".into(),
                name: "Alice".into(),
                email: "alice@example.com".into(),
                role,
            },
            token: "tok-123".into(),
        }
    }

    #[test]
    fn memory_store_round_trip_and_clear() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        store.save(&sample_session(Role::User)).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.user.name, "Alice");
        assert!(!loaded.is_admin());

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(&sample_session(Role::Admin)).unwrap();
        assert!(dir.path().join(USER_FILE).exists());
        assert!(dir.path().join(TOKEN_FILE).exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "tok-123");
        assert!(loaded.is_admin());

        store.clear();
        assert!(store.load().is_none());
        assert!(!dir.path().join(TOKEN_FILE).exists());
    }

    #[test]
    fn file_store_requires_both_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // Token alone is not a session.
        fs::write(dir.path().join(TOKEN_FILE), "tok-123").unwrap();
        assert!(store.load().is_none());

        // A corrupt user entry is treated as no session.
        fs::write(dir.path().join(USER_FILE), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_ignores_blank_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(&sample_session(Role::User)).unwrap();
        fs::write(dir.path().join(TOKEN_FILE), "  \n").unwrap();
        assert!(store.load().is_none());
    }
}
