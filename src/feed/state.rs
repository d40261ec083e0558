use crate::domain::CatalogItem;

/// Everything a list screen needs to render the feed right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    /// Active search text; empty means browse-all.
    pub query: String,
    /// Highest page whose results are in `items` (0 before the first load).
    pub page: u32,
    /// Results accumulated for this query, in response order. Duplicates
    /// across pages are kept.
    pub items: Vec<CatalogItem>,
    /// Provider's reported total for the query.
    pub total_count: i64,
    /// A first-page load (new query or refresh) is in flight.
    pub loading: bool,
    /// A next-page load is in flight.
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
    /// Identity of the current query session. Bumped on every query change
    /// and refresh; responses issued under an older epoch are dropped.
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    LoadingMore,
    Loaded { has_more: bool },
    Failed,
}

impl FeedState {
    pub fn phase(&self) -> FeedPhase {
        if self.loading {
            FeedPhase::Loading
        } else if self.loading_more {
            FeedPhase::LoadingMore
        } else if self.error.is_some() {
            FeedPhase::Failed
        } else if self.epoch == 0 {
            FeedPhase::Idle
        } else {
            FeedPhase::Loaded {
                has_more: self.has_more,
            }
        }
    }

    pub fn is_search(&self) -> bool {
        !self.query.is_empty()
    }

    pub(crate) fn can_load_more(&self) -> bool {
        !self.loading && !self.loading_more && self.has_more
    }
}
