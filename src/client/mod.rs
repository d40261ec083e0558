pub mod http_client;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{CatalogDetail, CatalogPage, ScreenshotPage};

pub use http_client::HttpCatalogClient;

/// Remote catalog endpoints.
#[async_trait]
pub trait CatalogClient {
    /// Fetch one page (1-based). `None` or an empty query browses everything.
    async fn list_page(&self, query: Option<&str>, page: u32) -> Result<CatalogPage>;

    async fn get_detail(&self, id: i64) -> Result<CatalogDetail>;

    async fn screenshots(&self, id: i64) -> Result<ScreenshotPage>;
}
