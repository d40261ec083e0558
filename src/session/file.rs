use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::app::{LudexError, Result};
use crate::session::{Session, SessionStore};

/// Session persisted as a small TOML file.
pub struct FileSessionStore {
    path: PathBuf,
    tx: watch::Sender<Session>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file means logged out; an
    /// unreadable one is logged and treated the same way.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let session = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                Session::default()
            })
        } else {
            Session::default()
        };

        let (tx, _) = watch::channel(session);
        Ok(Self { path, tx })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string(&session)
            .map_err(|e| LudexError::Storage(format!("failed to encode session: {}", e)))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn session_stream(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    async fn save(&self, logged_in: bool, user_id: i64) -> Result<()> {
        let session = Session {
            logged_in,
            user_id,
        };
        self.persist(session).await?;
        self.tx.send_replace(session);
        tracing::debug!("Session saved for user {}", user_id);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.tx.send_replace(Session::default());
        tracing::debug!("Session cleared");
        Ok(())
    }
}
