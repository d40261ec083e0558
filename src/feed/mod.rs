//! Paginated, searchable catalog feed.
//!
//! A [`CatalogFeed`] owns one query session at a time. Query text is
//! debounced by [`QUIESCENCE_WINDOW`] before it replaces the session; pages
//! are fetched forward-only and appended; `refresh` refetches page 1 and
//! replaces the items. Every fetch carries the epoch it was issued under and
//! is dropped if the session moved on while it was in flight.

pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{LudexError, Result};
use crate::client::CatalogClient;
use crate::domain::CatalogPage;

pub use state::{FeedPhase, FeedState};

/// Input must be stable this long before a query change is applied.
pub const QUIESCENCE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Merge {
    #[default]
    Replace,
    Append,
}

/// What a fetch was issued for.
#[derive(Debug, Clone, Default)]
struct Ticket {
    epoch: u64,
    query: String,
    page: u32,
    merge: Merge,
}

struct FeedCore {
    client: Arc<dyn CatalogClient + Send + Sync>,
    state: watch::Sender<FeedState>,
    timeout: Duration,
}

impl FeedCore {
    fn begin_query(&self, query: String) -> Ticket {
        let mut ticket = Ticket::default();
        self.state.send_modify(|s| {
            s.epoch += 1;
            s.query = query;
            s.page = 1;
            s.items.clear();
            s.total_count = 0;
            s.loading = true;
            s.loading_more = false;
            s.has_more = false;
            s.error = None;
            ticket = Ticket {
                epoch: s.epoch,
                query: s.query.clone(),
                page: 1,
                merge: Merge::Replace,
            };
        });
        ticket
    }

    fn begin_refresh(&self) -> Ticket {
        let mut ticket = Ticket::default();
        self.state.send_modify(|s| {
            s.epoch += 1;
            s.loading = true;
            s.loading_more = false;
            s.error = None;
            ticket = Ticket {
                epoch: s.epoch,
                query: s.query.clone(),
                page: 1,
                merge: Merge::Replace,
            };
        });
        ticket
    }

    fn begin_next_page(&self) -> Option<Ticket> {
        let mut ticket = None;
        self.state.send_if_modified(|s| {
            if !s.can_load_more() {
                return false;
            }
            s.loading_more = true;
            ticket = Some(Ticket {
                epoch: s.epoch,
                query: s.query.clone(),
                page: s.page + 1,
                merge: Merge::Append,
            });
            true
        });
        ticket
    }

    async fn fetch(&self, ticket: &Ticket) -> Result<CatalogPage> {
        let query = (!ticket.query.is_empty()).then_some(ticket.query.as_str());
        debug!("Fetching page {} for {:?}", ticket.page, query);

        match tokio::time::timeout(self.timeout, self.client.list_page(query, ticket.page)).await {
            Ok(result) => result,
            Err(_) => Err(LudexError::Timeout(self.timeout)),
        }
    }

    /// Apply a fetch result if its session is still current.
    fn apply(&self, ticket: &Ticket, result: Result<CatalogPage>) -> bool {
        self.state.send_if_modified(|s| {
            if s.epoch != ticket.epoch {
                debug!(
                    "Discarding page {} for {:?}: superseded (epoch {} < {})",
                    ticket.page, ticket.query, ticket.epoch, s.epoch
                );
                return false;
            }

            match result {
                Ok(page) => {
                    s.has_more = page.has_more();
                    s.total_count = page.count;
                    match ticket.merge {
                        Merge::Replace => s.items = page.results,
                        Merge::Append => s.items.extend(page.results),
                    }
                    s.page = ticket.page;
                    s.error = None;
                }
                Err(e) => {
                    warn!("Failed to load page {} for {:?}: {}", ticket.page, ticket.query, e);
                    s.error = Some(e.to_string());
                }
            }

            s.loading = false;
            s.loading_more = false;
            true
        })
    }

    async fn run(&self, ticket: Ticket) {
        let result = self.fetch(&ticket).await;
        self.apply(&ticket, result);
    }
}

/// Observable feed for one list screen.
///
/// Must be created inside a tokio runtime; the debouncer task is stopped
/// when the feed is dropped.
pub struct CatalogFeed {
    core: Arc<FeedCore>,
    query_tx: mpsc::UnboundedSender<String>,
    debouncer: JoinHandle<()>,
}

impl CatalogFeed {
    pub fn new(client: Arc<dyn CatalogClient + Send + Sync>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        let core = Arc::new(FeedCore {
            client,
            state,
            timeout,
        });

        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let debouncer = tokio::spawn(debounce(core.clone(), query_rx));

        Self {
            core,
            query_tx,
            debouncer,
        }
    }

    /// Observe the feed. The receiver sees the current state immediately.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.core.state.subscribe()
    }

    pub fn state(&self) -> FeedState {
        self.core.state.borrow().clone()
    }

    /// Replace the active query once input has been quiet for
    /// [`QUIESCENCE_WINDOW`]. Blank text browses everything.
    pub fn set_query(&self, text: impl Into<String>) {
        if self.query_tx.send(text.into()).is_err() {
            warn!("Feed debouncer has stopped; query ignored");
        }
    }

    /// Refetch page 1 of the current query and replace the items.
    ///
    /// Existing items stay visible until the new page arrives, and are kept
    /// if the refresh fails.
    pub async fn refresh(&self) {
        let ticket = self.core.begin_refresh();
        self.core.run(ticket).await;
    }

    /// Fetch and append the next page. No-op while any load is in flight or
    /// once the end of the results has been reached.
    pub async fn load_next_page(&self) {
        match self.core.begin_next_page() {
            Some(ticket) => self.core.run(ticket).await,
            None => debug!("load_next_page ignored"),
        }
    }
}

impl Drop for CatalogFeed {
    fn drop(&mut self) {
        self.debouncer.abort();
    }
}

async fn debounce(core: Arc<FeedCore>, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(mut pending) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(text) => pending = text,
                    None => return,
                },
                _ = tokio::time::sleep(QUIESCENCE_WINDOW) => break,
            }
        }

        let query = pending.trim().to_string();
        let unchanged = {
            let s = core.state.borrow();
            s.epoch > 0 && s.query == query
        };
        if unchanged {
            continue;
        }

        info!("Applying query {:?}", query);
        let ticket = core.begin_query(query);
        let core = core.clone();
        tokio::spawn(async move { core.run(ticket).await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;

    const TIMEOUT: Duration = Duration::from_secs(15);

    fn feed(client: MockClient) -> (CatalogFeed, Arc<MockClient>) {
        let client = Arc::new(client);
        (CatalogFeed::new(client.clone(), TIMEOUT), client)
    }

    async fn settle() {
        tokio::time::sleep(QUIESCENCE_WINDOW + Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_idle() {
        let (feed, client) = feed(MockClient::new());
        assert_eq!(feed.state().phase(), FeedPhase::Idle);

        feed.load_next_page().await;
        assert!(client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loads_first_page() {
        let (feed, client) = feed(MockClient::new().with_page("", 1, 1, 20));
        feed.refresh().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.page, 1);
        assert!(state.has_more);
        assert_eq!(state.phase(), FeedPhase::Loaded { has_more: true });
        assert_eq!(client.calls(), vec![(String::new(), 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_page_then_short_page_ends_feed() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 5),
        );

        feed.refresh().await;
        assert!(feed.state().has_more);

        feed.load_next_page().await;
        let state = feed.state();
        assert_eq!(state.items.len(), 25);
        assert_eq!(state.page, 2);
        assert!(!state.has_more);

        // Terminal for this session
        feed.load_next_page().await;
        assert_eq!(client.calls().len(), 2);
        assert_eq!(feed.state().items.len(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_full_pages_keep_has_more() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 20),
        );

        feed.refresh().await;
        feed.load_next_page().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 40);
        // Total may be an exact multiple of the page size; only an empty
        // page 3 would tell.
        assert!(state.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_page_ends_feed() {
        let (feed, _client) = feed(MockClient::new().with_page("", 1, 1, 20));

        feed.refresh().await;
        feed.load_next_page().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 20);
        assert!(!state.has_more);
        assert_eq!(state.page, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_across_pages_are_kept() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 15, 10),
        );

        feed.refresh().await;
        feed.load_next_page().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 30);
        let ids: Vec<i64> = state.items.iter().map(|i| i.id).collect();
        assert_eq!(&ids[..3], &[1, 2, 3]);
        assert_eq!(ids.iter().filter(|&&id| id == 15).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_next_page_in_flight() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 20)
                .with_delay("", Duration::from_secs(1)),
        );

        feed.refresh().await;
        tokio::join!(feed.load_next_page(), feed.load_next_page());

        let page_two_calls = client.calls().iter().filter(|(_, p)| *p == 2).count();
        assert_eq!(page_two_calls, 1);
        assert_eq!(feed.state().items.len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_page_failure_keeps_items_and_allows_retry() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_failure("", 2, "connection reset"),
        );

        feed.refresh().await;
        feed.load_next_page().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.page, 1);
        assert!(!state.loading_more);
        assert!(state.error.as_deref().unwrap().contains("connection reset"));
        assert_eq!(state.phase(), FeedPhase::Failed);

        client.set_page("", 2, 21, 3);
        feed.load_next_page().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 23);
        assert_eq!(state.page, 2);
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_keeps_existing_items() {
        let (feed, client) = feed(MockClient::new().with_page("", 1, 1, 20));
        feed.refresh().await;

        client.set_failure("", 1, "unexpected status 503");
        feed.refresh().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.page, 1);
        assert!(state.has_more);
        assert!(!state.loading);
        assert!(state.error.as_deref().unwrap().contains("503"));

        // Retry through the same operation
        client.set_page("", 1, 1, 20);
        feed.refresh().await;
        assert!(feed.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_replaces_items() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 20),
        );

        feed.refresh().await;
        feed.load_next_page().await;
        assert_eq!(feed.state().items.len(), 40);

        client.set_page("", 1, 100, 20);
        feed.refresh().await;

        let state = feed.state();
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.items[0].id, 100);
        assert_eq!(state.page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_error() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_delay("", Duration::from_secs(60)),
        );

        feed.refresh().await;

        let state = feed.state();
        assert!(state.items.is_empty());
        assert!(state.error.as_deref().unwrap().contains("timed out"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_queries_fetch_only_the_last() {
        let (feed, client) = feed(MockClient::new().with_page("zel", 1, 1, 3));

        for text in ["z", "ze", "zel"] {
            feed.set_query(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        settle().await;

        assert_eq!(client.calls(), vec![("zel".to_string(), 1)]);
        let state = feed.state();
        assert_eq!(state.query, "zel");
        assert_eq!(state.items.len(), 3);
        assert!(!state.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_change_resets_session() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 20)
                .with_page("mario", 1, 500, 4),
        );

        feed.refresh().await;
        feed.load_next_page().await;
        assert_eq!(feed.state().page, 2);

        feed.set_query("mario");
        settle().await;

        let state = feed.state();
        assert_eq!(state.page, 1);
        assert_eq!(state.items.len(), 4);
        assert!(state.items.iter().all(|i| i.id >= 500));
        assert!(state.is_search());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_query_is_not_refetched() {
        let (feed, client) = feed(MockClient::new().with_page("doom", 1, 1, 2));

        feed.set_query("doom");
        settle().await;
        feed.set_query(" doom ");
        settle().await;

        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_browses_all() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("doom", 1, 1, 2)
                .with_page("", 1, 100, 20),
        );

        feed.set_query("doom");
        settle().await;
        feed.set_query("   ");
        settle().await;

        assert_eq!(client.calls().last().unwrap(), &(String::new(), 1));
        assert!(!feed.state().is_search());
        assert_eq!(feed.state().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_for_old_query_is_discarded() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("a", 1, 1, 20)
                .with_page("b", 1, 900, 2)
                .with_delay("a", Duration::from_secs(2)),
        );

        feed.set_query("a");
        settle().await;
        assert!(feed.state().loading);

        feed.set_query("b");
        settle().await;

        let state = feed.state();
        assert_eq!(state.query, "b");
        assert_eq!(state.items.len(), 2);

        // Let the slow "a" response land
        tokio::time::sleep(Duration::from_secs(3)).await;

        let state = feed.state();
        assert_eq!(state.query, "b");
        assert_eq!(state.items.len(), 2);
        assert!(state.items.iter().all(|i| i.id >= 900));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_supersedes_in_flight_next_page() {
        let (feed, client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 20)
                .with_page("", 2, 21, 20),
        );
        feed.refresh().await;

        let stale = feed.core.begin_next_page().unwrap();
        feed.refresh().await;

        let page = client.list_page(None, 2).await;
        assert!(!feed.core.apply(&stale, page));
        assert_eq!(feed.state().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_loading_then_result() {
        let (feed, _client) = feed(
            MockClient::new()
                .with_page("", 1, 1, 5)
                .with_delay("", Duration::from_secs(1)),
        );
        let mut rx = feed.subscribe();

        let feed = Arc::new(feed);
        let task = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.refresh().await })
        };

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading);

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(state.items.len(), 5);

        task.await.unwrap();
    }
}
