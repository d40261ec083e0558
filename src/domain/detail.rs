use serde::{Deserialize, Serialize};

use super::item::{playtime, CatalogItem};
use super::null_as_empty;

/// A named provider entity (genre, developer, publisher, platform, age rating).
///
/// Identifiers are optional: records rebuilt from a bookmark only carry names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Tag {
    /// A tag known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            slug: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformEntry {
    #[serde(default)]
    pub platform: Option<Tag>,
}

/// Full record for one catalog entry, from the detail endpoint or a bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDetail {
    pub id: i64,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "background_image", default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "released", default)]
    pub release_date: Option<String>,
    #[serde(rename = "metacritic", default)]
    pub critic_score: Option<i32>,
    #[serde(rename = "playtime", default, deserialize_with = "playtime")]
    pub playtime_hours: i32,
    #[serde(rename = "esrb_rating", default)]
    pub age_rating: Option<Tag>,
    #[serde(rename = "description_raw", default)]
    pub description: Option<String>,
    #[serde(rename = "website", default)]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platforms: Vec<PlatformEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub developers: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publishers: Vec<Tag>,
}

fn names<'a>(tags: impl Iterator<Item = &'a Tag>) -> Vec<String> {
    tags.filter_map(|t| t.name.clone()).collect()
}

impl CatalogDetail {
    pub fn platform_names(&self) -> Vec<String> {
        names(self.platforms.iter().filter_map(|p| p.platform.as_ref()))
    }

    pub fn genre_names(&self) -> Vec<String> {
        names(self.genres.iter())
    }

    pub fn developer_names(&self) -> Vec<String> {
        names(self.developers.iter())
    }

    pub fn publisher_names(&self) -> Vec<String> {
        names(self.publishers.iter())
    }

    pub fn age_rating_name(&self) -> Option<&str> {
        self.age_rating.as_ref().and_then(|r| r.name.as_deref())
    }

    /// Website URL, treating the provider's empty string as absent.
    pub fn website(&self) -> Option<&str> {
        self.website_url.as_deref().filter(|w| !w.trim().is_empty())
    }

    pub fn summary(&self) -> CatalogItem {
        CatalogItem {
            id: self.id,
            title: self.title.clone(),
            cover_image_url: self.cover_image_url.clone(),
            rating: self.rating,
            release_date: self.release_date.clone(),
            genre_names: self.genre_names(),
            age_rating_name: self.age_rating_name().map(String::from),
            critic_score: self.critic_score,
            playtime_hours: self.playtime_hours,
        }
    }
}
