use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::{LudexError, Result};
use crate::client::CatalogClient;
use crate::domain::{CatalogDetail, CatalogPage, ScreenshotPage, PAGE_SIZE};

pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("ludex/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join drops the last path segment unless the base ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    pub(crate) fn list_url(&self, query: Option<&str>, page: u32) -> Result<Url> {
        let mut url = self.endpoint("games")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &page.to_string())
                .append_pair("page_size", &PAGE_SIZE.to_string());
            if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
                pairs.append_pair("search", query);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LudexError::Network(format!(
                "unexpected status {} from catalog",
                status
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| LudexError::Network(format!("malformed catalog response: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_page(&self, query: Option<&str>, page: u32) -> Result<CatalogPage> {
        let url = self.list_url(query, page)?;
        self.get_json(url).await
    }

    async fn get_detail(&self, id: i64) -> Result<CatalogDetail> {
        let url = self.endpoint(&format!("games/{}", id))?;
        self.get_json(url).await
    }

    async fn screenshots(&self, id: i64) -> Result<ScreenshotPage> {
        let url = self.endpoint(&format!("games/{}/screenshots", id))?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpCatalogClient {
        HttpCatalogClient::new(
            "https://catalog.example.com/api",
            Some("k3y".into()),
            DEFAULT_TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn test_list_url_browse() {
        let url = client().list_url(None, 3).unwrap();
        assert_eq!(url.path(), "/api/games");
        assert_eq!(url.query(), Some("key=k3y&page=3&page_size=20"));
    }

    #[test]
    fn test_list_url_search_is_encoded() {
        let url = client().list_url(Some("  zelda botw "), 1).unwrap();
        assert_eq!(
            url.query(),
            Some("key=k3y&page=1&page_size=20&search=zelda+botw")
        );
    }

    #[test]
    fn test_list_url_blank_query_browses() {
        let url = client().list_url(Some("   "), 1).unwrap();
        assert!(!url.query().unwrap_or_default().contains("search"));
    }

    #[test]
    fn test_detail_endpoint_without_key() {
        let client =
            HttpCatalogClient::new(DEFAULT_BASE_URL, None, DEFAULT_TIMEOUT).unwrap();
        let url = client.endpoint("games/42/screenshots").unwrap();
        assert_eq!(url.as_str(), "https://api.rawg.io/api/games/42/screenshots");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpCatalogClient::new("not a url", None, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(LudexError::InvalidUrl(_))));
    }
}
