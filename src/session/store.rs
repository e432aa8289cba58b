//! Durable storage for the session record

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::SessionResult;
use crate::models::{Session, User};

/// On-disk shape of the session record
///
/// Both fields are optional so that a record missing either half can be
/// recognized and discarded instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl PersistedSession {
    /// A usable session only when both token and user are present
    pub fn into_session(self) -> Option<Session> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Some(Session::new(user, token)),
            _ => None,
        }
    }
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            user: Some(session.user.clone()),
        }
    }
}

/// Storage backend for the session record
///
/// `save` and `clear` act on the whole record at once.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted record, `None` when nothing is stored
    async fn load(&self) -> SessionResult<Option<PersistedSession>>;

    /// Replace the persisted record
    async fn save(&self, session: &Session) -> SessionResult<()>;

    /// Remove the persisted record
    async fn clear(&self) -> SessionResult<()>;
}

/// Session record stored as a JSON file
///
/// Writes go to a sibling temp file that is renamed over the target, so
/// readers see either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Write `content` to a fresh file readable only by its owner on unix
async fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> SessionResult<Option<PersistedSession>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: PersistedSession = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn save(&self, session: &Session) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(&PersistedSession::from(session))?;
        let temp = self.temp_path();
        write_private(&temp, content.as_bytes()).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = ?self.path, "Session record saved");
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Session record removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session record held in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary record, including half-written ones
    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    pub async fn record(&self) -> Option<PersistedSession> {
        self.record.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> SessionResult<Option<PersistedSession>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> SessionResult<()> {
        *self.record.lock().await = Some(PersistedSession::from(session));
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        *self.record.lock().await = None;
        Ok(())
    }
}
