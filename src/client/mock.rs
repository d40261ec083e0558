use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{LudexError, Result};
use crate::client::CatalogClient;
use crate::domain::{CatalogDetail, CatalogItem, CatalogPage, Screenshot, ScreenshotPage};

/// Scripted in-process catalog for tests.
#[derive(Default)]
pub struct MockClient {
    pages: Mutex<HashMap<(String, u32), std::result::Result<CatalogPage, String>>>,
    delays: Mutex<HashMap<String, Duration>>,
    details: Mutex<HashMap<i64, CatalogDetail>>,
    calls: Mutex<Vec<(String, u32)>>,
    detail_calls: Mutex<Vec<i64>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `count` items for `(query, page)`, ids starting at `first_id`.
    pub fn with_page(self, query: &str, page: u32, first_id: i64, count: usize) -> Self {
        let results = (0..count as i64).map(|i| item(first_id + i, query)).collect();
        self.pages.lock().unwrap().insert(
            (query.to_string(), page),
            Ok(CatalogPage {
                count: 1000,
                results,
            }),
        );
        self
    }

    pub fn with_failure(self, query: &str, page: u32, message: &str) -> Self {
        self.pages.lock().unwrap().insert(
            (query.to_string(), page),
            Err(message.to_string()),
        );
        self
    }

    /// Every request for `query` sleeps for `delay` before answering.
    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
        self
    }

    pub fn with_detail(self, detail: CatalogDetail) -> Self {
        self.details.lock().unwrap().insert(detail.id, detail);
        self
    }

    /// Replace the scripted answer for `(query, page)` after construction.
    pub fn set_page(&self, query: &str, page: u32, first_id: i64, count: usize) {
        let results = (0..count as i64).map(|i| item(first_id + i, query)).collect();
        self.pages.lock().unwrap().insert(
            (query.to_string(), page),
            Ok(CatalogPage {
                count: 1000,
                results,
            }),
        );
    }

    pub fn set_failure(&self, query: &str, page: u32, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<i64> {
        self.detail_calls.lock().unwrap().clone()
    }
}

pub fn item(id: i64, query: &str) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("{} #{}", if query.is_empty() { "Game" } else { query }, id),
        cover_image_url: None,
        rating: 4.0,
        release_date: None,
        genre_names: vec!["Action".into()],
        age_rating_name: None,
        critic_score: None,
        playtime_hours: 0,
    }
}

#[async_trait]
impl CatalogClient for MockClient {
    async fn list_page(&self, query: Option<&str>, page: u32) -> Result<CatalogPage> {
        let query = query.unwrap_or_default().to_string();
        self.calls.lock().unwrap().push((query.clone(), page));

        let delay = self.delays.lock().unwrap().get(&query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.pages.lock().unwrap().get(&(query, page)).cloned();
        match scripted {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(LudexError::Network(message)),
            None => Ok(CatalogPage::default()),
        }
    }

    async fn get_detail(&self, id: i64) -> Result<CatalogDetail> {
        self.detail_calls.lock().unwrap().push(id);
        let detail = self.details.lock().unwrap().get(&id).cloned();
        detail.ok_or_else(|| LudexError::Network(format!("unexpected status 404 for game {}", id)))
    }

    async fn screenshots(&self, id: i64) -> Result<ScreenshotPage> {
        Ok(ScreenshotPage {
            count: 1,
            results: vec![Screenshot {
                id: id * 10,
                image: format!("https://media.example.com/{}/1.jpg", id),
            }],
        })
    }
}
