pub mod file;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::app::Result;

pub use file::FileSessionStore;

/// Login state shared by every screen of one application run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    pub user_id: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            logged_in: false,
            user_id: -1,
        }
    }
}

impl Session {
    /// The owner id to key bookmarks by, if someone is logged in.
    pub fn owner_id(&self) -> Option<i64> {
        (self.logged_in && self.user_id >= 0).then_some(self.user_id)
    }
}

#[async_trait]
pub trait SessionStore {
    /// Observe the session. The receiver sees the current value immediately.
    fn session_stream(&self) -> watch::Receiver<Session>;

    fn current(&self) -> Session {
        let rx = self.session_stream();
        let session = *rx.borrow();
        session
    }

    async fn save(&self, logged_in: bool, user_id: i64) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Session kept only for the lifetime of the process.
pub struct MemorySessionStore {
    tx: watch::Sender<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::default());
        Self { tx }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn session_stream(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    async fn save(&self, logged_in: bool, user_id: i64) -> Result<()> {
        self.tx.send_replace(Session {
            logged_in,
            user_id,
        });
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.tx.send_replace(Session::default());
        Ok(())
    }
}
