//! Detail lookup that prefers a user's bookmark snapshot over the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::app::{LudexError, Result};
use crate::client::CatalogClient;
use crate::domain::{CatalogDetail, Resource, ScreenshotPage};
use crate::store::Store;

/// Where a resolved detail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    Bookmark,
    Remote,
}

/// Detail and screenshots for one item, loaded together.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub detail: Resource<(CatalogDetail, DetailSource)>,
    pub screenshots: Resource<ScreenshotPage>,
}

pub struct DetailResolver<S: Store> {
    store: Arc<S>,
    client: Arc<dyn CatalogClient + Send + Sync>,
    timeout: Duration,
}

impl<S: Store> Clone for DetailResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: self.client.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: Store + Send + Sync + 'static> DetailResolver<S> {
    pub fn new(
        store: Arc<S>,
        client: Arc<dyn CatalogClient + Send + Sync>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            client,
            timeout,
        }
    }

    /// Resolve `item_id` for `owner_id`: the bookmark snapshot if one exists,
    /// otherwise the remote detail as returned.
    pub async fn resolve(&self, item_id: i64, owner_id: i64) -> Result<(CatalogDetail, DetailSource)> {
        if let Some(record) = self.store.get_bookmark(item_id, owner_id)? {
            debug!("Detail {} for owner {} served from bookmark", item_id, owner_id);
            return Ok((record.to_detail()?, DetailSource::Bookmark));
        }

        debug!("Detail {} not bookmarked by {}; fetching", item_id, owner_id);
        let detail = self.with_timeout(self.client.get_detail(item_id)).await?;
        Ok((detail, DetailSource::Remote))
    }

    pub async fn screenshots(&self, item_id: i64) -> Result<ScreenshotPage> {
        self.with_timeout(self.client.screenshots(item_id)).await
    }

    /// Resolve detail and screenshots concurrently. Either half may fail
    /// without affecting the other.
    pub async fn load(&self, item_id: i64, owner_id: i64) -> DetailView {
        let (detail, screenshots) = futures::future::join(
            self.resolve(item_id, owner_id),
            self.screenshots(item_id),
        )
        .await;

        if let Err(e) = &screenshots {
            warn!("Screenshots for {} unavailable: {}", item_id, e);
        }

        DetailView {
            detail: detail.into(),
            screenshots: screenshots.into(),
        }
    }

    /// Observe resolution of `item_id` for `owner_id`: `Loading`, then
    /// `Success` or `Error`.
    pub fn watch(&self, item_id: i64, owner_id: i64) -> watch::Receiver<Resource<CatalogDetail>> {
        let (tx, rx) = watch::channel(Resource::Loading);
        let resolver = self.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(item_id, owner_id).await.map(|(d, _)| d);
            tx.send_replace(result.into());
        });
        rx
    }

    pub fn watch_screenshots(&self, item_id: i64) -> watch::Receiver<Resource<ScreenshotPage>> {
        let (tx, rx) = watch::channel(Resource::Loading);
        let resolver = self.clone();
        tokio::spawn(async move {
            tx.send_replace(resolver.screenshots(item_id).await.into());
        });
        rx
    }

    async fn with_timeout<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| LudexError::Timeout(self.timeout))?
    }
}
