//! Per-user bookmark toggling with observable state.
//!
//! Toggles for the same `(item_id, owner_id)` run one at a time. Observers
//! of that key and of the owner's list see the result once it commits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::{LudexError, Result};
use crate::domain::{BookmarkRecord, CatalogDetail};
use crate::store::Store;

type Key = (i64, i64);

pub struct Bookmarks<S: Store> {
    store: Arc<S>,
    locks: Mutex<HashMap<Key, Arc<tokio::sync::Mutex<()>>>>,
    exists: Mutex<HashMap<Key, watch::Sender<bool>>>,
    lists: Mutex<HashMap<i64, watch::Sender<Vec<BookmarkRecord>>>>,
}

impl<S: Store + Send + Sync + 'static> Bookmarks<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            exists: Mutex::new(HashMap::new()),
            lists: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, item_id: i64, owner_id: i64) -> Result<Option<BookmarkRecord>> {
        self.store.get_bookmark(item_id, owner_id)
    }

    pub fn is_bookmarked(&self, item_id: i64, owner_id: i64) -> Result<bool> {
        self.store.bookmark_exists(item_id, owner_id)
    }

    /// Most recently bookmarked first.
    pub fn list(&self, owner_id: i64) -> Result<Vec<BookmarkRecord>> {
        self.store.bookmarks_for_owner(owner_id)
    }

    /// Observe whether `(item_id, owner_id)` is bookmarked.
    pub fn exists_stream(&self, item_id: i64, owner_id: i64) -> Result<watch::Receiver<bool>> {
        let mut channels = self.exists.lock().map_err(LudexError::poisoned)?;
        if let Some(tx) = channels.get(&(item_id, owner_id)) {
            return Ok(tx.subscribe());
        }
        let current = self.store.bookmark_exists(item_id, owner_id)?;
        let (tx, rx) = watch::channel(current);
        channels.insert((item_id, owner_id), tx);
        Ok(rx)
    }

    /// Observe every bookmark `owner_id` holds.
    pub fn all_for_owner(&self, owner_id: i64) -> Result<watch::Receiver<Vec<BookmarkRecord>>> {
        let mut channels = self.lists.lock().map_err(LudexError::poisoned)?;
        if let Some(tx) = channels.get(&owner_id) {
            return Ok(tx.subscribe());
        }
        let current = self.store.bookmarks_for_owner(owner_id)?;
        let (tx, rx) = watch::channel(current);
        channels.insert(owner_id, tx);
        Ok(rx)
    }

    /// Bookmark `detail` for `owner_id` if it is not bookmarked, otherwise
    /// remove the bookmark. Returns whether the item is now bookmarked.
    pub async fn toggle(&self, detail: &CatalogDetail, owner_id: i64) -> Result<bool> {
        let record = BookmarkRecord::from_detail(detail, owner_id)?;
        let lock = self.key_lock((detail.id, owner_id))?;
        let _guard = lock.lock().await;

        let bookmarked = self.store.toggle_bookmark(&record)?;
        if bookmarked {
            info!("Bookmarked {} for owner {}", detail.id, owner_id);
        } else {
            info!("Removed bookmark {} for owner {}", detail.id, owner_id);
        }

        self.publish(detail.id, owner_id, bookmarked);
        Ok(bookmarked)
    }

    /// Start a toggle without waiting for it. Toggles of the same key still
    /// apply in the order they were started.
    pub fn spawn_toggle(self: &Arc<Self>, detail: CatalogDetail, owner_id: i64) -> JoinHandle<Result<bool>> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.toggle(&detail, owner_id).await;
            if let Err(e) = &result {
                warn!("Bookmark toggle for {} failed: {}", detail.id, e);
            }
            result
        })
    }

    pub async fn put(&self, record: &BookmarkRecord) -> Result<()> {
        let lock = self.key_lock((record.item_id, record.owner_id))?;
        let _guard = lock.lock().await;

        self.store.put_bookmark(record)?;
        self.publish(record.item_id, record.owner_id, true);
        Ok(())
    }

    pub async fn delete(&self, item_id: i64, owner_id: i64) -> Result<bool> {
        let lock = self.key_lock((item_id, owner_id))?;
        let _guard = lock.lock().await;

        let removed = self.store.delete_bookmark(item_id, owner_id)?;
        if removed {
            self.publish(item_id, owner_id, false);
        }
        Ok(removed)
    }

    fn key_lock(&self, key: Key) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(LudexError::poisoned)?;
        Ok(locks.entry(key).or_default().clone())
    }

    // The write has committed by now; a failed list refresh only delays
    // observers until the next change.
    fn publish(&self, item_id: i64, owner_id: i64, bookmarked: bool) {
        if let Ok(channels) = self.exists.lock() {
            if let Some(tx) = channels.get(&(item_id, owner_id)) {
                tx.send_if_modified(|current| {
                    let changed = *current != bookmarked;
                    *current = bookmarked;
                    changed
                });
            }
        }

        let Ok(channels) = self.lists.lock() else {
            return;
        };
        if let Some(tx) = channels.get(&owner_id) {
            match self.store.bookmarks_for_owner(owner_id) {
                Ok(records) => {
                    tx.send_replace(records);
                }
                Err(e) => warn!("Failed to refresh bookmarks for owner {}: {}", owner_id, e),
            }
        }
    }
}
