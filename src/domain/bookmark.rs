use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{LudexError, Result};
use crate::domain::{CatalogDetail, PlatformEntry, Tag};

/// A user-owned snapshot of a [`CatalogDetail`], keyed by `(item_id, owner_id)`.
///
/// List fields are stored as independent JSON arrays of plain names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub item_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub cover_image_url: Option<String>,
    pub rating: f64,
    pub critic_score: Option<i32>,
    pub release_date: Option<String>,
    pub playtime_hours: i32,
    pub age_rating_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub platforms_json: Option<String>,
    pub genres_json: Option<String>,
    pub developers_json: Option<String>,
    pub publishers_json: Option<String>,
    pub bookmarked_at: DateTime<Utc>,
}

impl BookmarkRecord {
    /// Snapshot `detail` for `owner_id`. Absent lists serialize as `[]`.
    pub fn from_detail(detail: &CatalogDetail, owner_id: i64) -> Result<Self> {
        Ok(Self {
            item_id: detail.id,
            owner_id,
            title: detail.title.clone(),
            cover_image_url: detail.cover_image_url.clone(),
            rating: detail.rating,
            critic_score: detail.critic_score,
            release_date: detail.release_date.clone(),
            playtime_hours: detail.playtime_hours,
            age_rating_name: detail.age_rating_name().map(String::from),
            description: detail.description.clone(),
            website_url: detail.website_url.clone(),
            platforms_json: Some(encode_names(&detail.platform_names())?),
            genres_json: Some(encode_names(&detail.genre_names())?),
            developers_json: Some(encode_names(&detail.developer_names())?),
            publishers_json: Some(encode_names(&detail.publisher_names())?),
            bookmarked_at: Utc::now(),
        })
    }

    /// Rebuild a detail from the snapshot.
    ///
    /// Nested identifiers are not kept, so every rebuilt tag has `id` and
    /// `slug` set to `None`.
    pub fn to_detail(&self) -> Result<CatalogDetail> {
        let tags = |json: &Option<String>| -> Result<Vec<Tag>> {
            Ok(decode_names(json.as_deref())?
                .into_iter()
                .map(Tag::named)
                .collect())
        };

        Ok(CatalogDetail {
            id: self.item_id,
            title: self.title.clone(),
            cover_image_url: self.cover_image_url.clone(),
            rating: self.rating,
            release_date: self.release_date.clone(),
            critic_score: self.critic_score,
            playtime_hours: self.playtime_hours,
            age_rating: self.age_rating_name.clone().map(Tag::named),
            description: self.description.clone(),
            website_url: self.website_url.clone(),
            platforms: tags(&self.platforms_json)?
                .into_iter()
                .map(|t| PlatformEntry { platform: Some(t) })
                .collect(),
            genres: tags(&self.genres_json)?,
            developers: tags(&self.developers_json)?,
            publishers: tags(&self.publishers_json)?,
        })
    }

    pub fn genre_names(&self) -> Vec<String> {
        decode_names(self.genres_json.as_deref()).unwrap_or_default()
    }
}

fn encode_names(names: &[String]) -> Result<String> {
    serde_json::to_string(names)
        .map_err(|e| LudexError::Storage(format!("failed to encode bookmark list: {}", e)))
}

/// Missing column or JSON `null` both decode to an empty list.
fn decode_names(json: Option<&str>) -> Result<Vec<String>> {
    let Some(json) = json else {
        return Ok(Vec::new());
    };
    let names: Option<Vec<String>> = serde_json::from_str(json)
        .map_err(|e| LudexError::Storage(format!("corrupt bookmark list: {}", e)))?;
    Ok(names.unwrap_or_default())
}
