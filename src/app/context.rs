use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{LudexError, Result};
use crate::auth::Auth;
use crate::bookmarks::Bookmarks;
use crate::client::{CatalogClient, HttpCatalogClient};
use crate::config::Config;
use crate::detail::DetailResolver;
use crate::feed::CatalogFeed;
use crate::session::{FileSessionStore, SessionStore};
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub client: Arc<dyn CatalogClient + Send + Sync>,
    pub session: Arc<dyn SessionStore + Send + Sync>,
    pub auth: Auth<SqliteStore>,
    pub bookmarks: Arc<Bookmarks<SqliteStore>>,
    pub details: DetailResolver<SqliteStore>,
    timeout: Duration,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = match &config.storage.database_path {
            Some(p) => p.clone(),
            None => Self::data_dir()?.join("ludex.db"),
        };
        let session_path = match &config.storage.session_path {
            Some(p) => p.clone(),
            None => Self::data_dir()?.join("session.toml"),
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let client: Arc<dyn CatalogClient + Send + Sync> = Arc::new(HttpCatalogClient::new(
            &config.api.base_url,
            config.api.api_key.clone(),
            config.api.timeout(),
        )?);
        let session: Arc<dyn SessionStore + Send + Sync> =
            Arc::new(FileSessionStore::open(&session_path)?);

        Ok(Self::assemble(store, client, session, config.api.timeout()))
    }

    /// Context over an in-memory database, for tests and throwaway runs.
    pub fn in_memory(
        client: Arc<dyn CatalogClient + Send + Sync>,
        session: Arc<dyn SessionStore + Send + Sync>,
        timeout: Duration,
    ) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::assemble(store, client, session, timeout))
    }

    fn assemble(
        store: Arc<SqliteStore>,
        client: Arc<dyn CatalogClient + Send + Sync>,
        session: Arc<dyn SessionStore + Send + Sync>,
        timeout: Duration,
    ) -> Self {
        let auth = Auth::new(store.clone(), session.clone());
        let bookmarks = Arc::new(Bookmarks::new(store.clone()));
        let details = DetailResolver::new(store.clone(), client.clone(), timeout);

        Self {
            store,
            client,
            session,
            auth,
            bookmarks,
            details,
            timeout,
        }
    }

    /// A fresh feed over this context's catalog client.
    pub fn feed(&self) -> CatalogFeed {
        CatalogFeed::new(self.client.clone(), self.timeout)
    }

    fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| LudexError::Config("Could not find data directory".into()))?;
        let ludex_dir = data_dir.join("ludex");
        std::fs::create_dir_all(&ludex_dir)?;
        Ok(ludex_dir)
    }
}
