//! The user's session: bearer token, cached API key and user record.
//!
//! A session is created at login, gains an API key the first time an
//! authenticated call needs one, and is cleared wholesale at logout.
//! Persistence goes through a [`SessionStore`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::secrets::{ApiKey, BearerToken};
use crate::types::{Profile, media_url};

/// Session storage errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// IO error reading/writing the session file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Cached copy of the logged-in user.
///
/// Only used for display and for picking the profile to load; the API
/// remains the authority for anything it enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Profile name.
    pub name: String,

    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Credits at the time of the last refresh.
    #[serde(default, deserialize_with = "crate::types::lenient_credits")]
    pub credits: i64,

    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,

    /// Banner URL.
    #[serde(default)]
    pub banner: Option<String>,

    /// Bio.
    #[serde(default)]
    pub bio: Option<String>,
}

impl UserRecord {
    /// Build a record from a freshly loaded profile.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone().unwrap_or_default(),
            credits: profile.credits,
            avatar: profile.avatar.as_ref().and_then(|m| m.url()).map(str::to_string),
            banner: profile.banner.as_ref().and_then(|m| m.url()).map(str::to_string),
            bio: profile.bio.clone(),
        }
    }

    /// Merge the editable fields of an updated profile.
    pub fn merge_profile_update(&mut self, profile: &Profile) {
        self.bio.clone_from(&profile.bio);
        let avatar = media_url(profile.avatar.as_ref(), "");
        self.avatar = (!avatar.is_empty()).then(|| avatar.to_string());
        let banner = media_url(profile.banner.as_ref(), "");
        self.banner = (!banner.is_empty()).then(|| banner.to_string());
    }

    /// Navbar-style credits badge.
    #[must_use]
    pub fn credits_badge(&self) -> String {
        format!("{} credits", self.credits)
    }
}

/// The explicit session object.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<BearerToken>,
    api_key: Option<ApiKey>,
    user: Option<UserRecord>,
}

impl Session {
    /// Start a fresh session after login. Any previous API key is dropped.
    #[must_use]
    pub fn start(token: BearerToken, user: UserRecord) -> Self {
        Self {
            token: Some(token),
            api_key: None,
            user: Some(user),
        }
    }

    /// Bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Cached API key, if provisioned.
    #[must_use]
    pub const fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Cached user record.
    #[must_use]
    pub const fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// Whether a token and a user name are both present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some() && self.user.as_ref().is_some_and(|u| !u.name.is_empty())
    }

    /// Cache a provisioned API key.
    pub fn set_api_key(&mut self, key: ApiKey) {
        self.api_key = Some(key);
    }

    /// Replace the cached user record.
    pub fn set_user(&mut self, user: UserRecord) {
        self.user = Some(user);
    }

    /// Mutable access to the cached user record.
    pub fn user_mut(&mut self) -> Option<&mut UserRecord> {
        self.user.as_mut()
    }
}

/// On-disk shape of a session. Secrets are wiped when dropped.
#[derive(Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    #[zeroize(skip)]
    user: Option<UserRecord>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.token.as_ref().map(|t| t.expose().to_string()),
            api_key: session.api_key.as_ref().map(|k| k.expose().to_string()),
            user: session.user.clone(),
        }
    }
}

impl From<&StoredSession> for Session {
    fn from(stored: &StoredSession) -> Self {
        Self {
            token: stored
                .access_token
                .clone()
                .filter(|t| !t.is_empty())
                .map(BearerToken::new),
            api_key: stored
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .map(ApiKey::new),
            user: stored.user.clone(),
        }
    }
}

/// Trait for persisting the session between commands.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the current session (empty if none was saved).
    async fn load(&self) -> Result<Session, SessionError>;

    /// Overwrite the stored session.
    async fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove every stored value.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Session stored as JSON in the state directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the session file.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Sibling file written before being renamed over the session file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session, SessionError> {
        let mut content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => return Err(e.into()),
        };
        let parsed = serde_json::from_str::<StoredSession>(&content);
        content.zeroize();

        match parsed {
            Ok(stored) => Ok(Session::from(&stored)),
            Err(e) => {
                // An unreadable session is treated as logged out
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                Ok(Session::default())
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stored = StoredSession::from(session);
        let mut content = serde_json::to_string_pretty(&stored)?;

        // Write to a temp file with restricted permissions, then rename over the target
        let temp_path = self.temp_path();
        let written = write_private(&temp_path, content.as_bytes()).await;
        content.zeroize();
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SessionError::Storage(format!(
                "Failed to rename '{}' to '{}': {e}",
                temp_path.display(),
                self.path.display()
            )));
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create (or truncate) `path` readable by the owner only and write `content`.
async fn write_private(path: &std::path::Path, content: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;

    // A leftover temp file keeps its old mode, so set it explicitly too
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(content).await?;
    file.sync_all().await
}

/// In-memory session storage for testing.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Session>,
}

impl MemorySessionStore {
    /// Create an empty (logged out) store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Session, SessionError> {
        let guard = self
            .session
            .read()
            .map_err(|e| SessionError::Storage(format!("Lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut guard = self
            .session
            .write()
            .map_err(|e| SessionError::Storage(format!("Lock poisoned: {e}")))?;
        *guard = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self
            .session
            .write()
            .map_err(|e| SessionError::Storage(format!("Lock poisoned: {e}")))?;
        *guard = Session::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn kari() -> UserRecord {
        UserRecord {
            name: "kari".to_string(),
            email: "kari@stud.noroff.no".to_string(),
            credits: 1000,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_drops_previous_key() {
        let mut session = Session::start(BearerToken::new("t1".to_string()), kari());
        session.set_api_key(ApiKey::new("k1".to_string()));
        assert!(session.api_key().is_some());

        let session = Session::start(BearerToken::new("t2".to_string()), kari());
        assert!(session.api_key().is_none());
        assert!(session.is_logged_in());
    }

    #[test]
    fn test_default_session_is_logged_out() {
        let session = Session::default();
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp = tempdir().unwrap();
        let store = FileSessionStore::new(temp.path().join("session.json"));

        let mut session = Session::start(BearerToken::new("tok".to_string()), kari());
        session.set_api_key(ApiKey::new("key".to_string()));
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.token().unwrap().expose(), "tok");
        assert_eq!(loaded.api_key().unwrap().expose(), "key");
        assert_eq!(loaded.user(), Some(&kari()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_file_store_writes_through_private_temp_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("session.json");
        let store = FileSessionStore::new(path.clone());
        let temp_file = temp.path().join("nested").join("session.json.tmp");

        // A stale temp file from an interrupted save, world-readable
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&temp_file, "stale").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_file, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        store
            .save(&Session::start(BearerToken::new("tok".to_string()), kari()))
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!temp_file.exists());
        assert_eq!(store.load().await.unwrap().token().unwrap().expose(), "tok");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        // Saving over an existing file replaces it in place
        store
            .save(&Session::start(BearerToken::new("tok2".to_string()), kari()))
            .await
            .unwrap();
        assert!(!temp_file.exists());
        assert_eq!(store.load().await.unwrap().token().unwrap().expose(), "tok2");
    }

    #[tokio::test]
    async fn test_file_store_missing_and_corrupt() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("session.json");
        let store = FileSessionStore::new(path.clone());

        assert!(store.load().await.unwrap().token().is_none());

        std::fs::write(&path, "{not json").unwrap();
        assert!(store.load().await.unwrap().token().is_none());
    }

    #[tokio::test]
    async fn test_file_store_clear() {
        let temp = tempdir().unwrap();
        let store = FileSessionStore::new(temp.path().join("session.json"));

        store
            .save(&Session::start(BearerToken::new("tok".to_string()), kari()))
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());

        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().token().is_none());

        store
            .save(&Session::start(BearerToken::new("tok".to_string()), kari()))
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_logged_in());

        store.clear().await.unwrap();
        assert!(!store.load().await.unwrap().is_logged_in());
    }

    #[test]
    fn test_user_record_from_profile() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "name": "kari",
            "email": "kari@stud.noroff.no",
            "credits": 740,
            "avatar": {"url": "https://img.test/a.png", "alt": ""},
            "banner": "https://img.test/b.png",
            "bio": "Selling bikes"
        }))
        .unwrap();

        let user = UserRecord::from_profile(&profile);
        assert_eq!(user.credits, 740);
        assert_eq!(user.avatar.as_deref(), Some("https://img.test/a.png"));
        assert_eq!(user.banner.as_deref(), Some("https://img.test/b.png"));
        assert_eq!(user.credits_badge(), "740 credits");
    }
}
