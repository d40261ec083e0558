use serde::{Deserialize, Deserializer};

use super::null_as_empty;

/// Number of items the provider returns for a full page.
pub const PAGE_SIZE: usize = 20;

/// Summary record for one catalog entry, as returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "background_image", default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "released", default)]
    pub release_date: Option<String>,
    #[serde(rename = "genres", default, deserialize_with = "genre_names")]
    pub genre_names: Vec<String>,
    #[serde(rename = "esrb_rating", default, deserialize_with = "age_rating_name")]
    pub age_rating_name: Option<String>,
    #[serde(rename = "metacritic", default)]
    pub critic_score: Option<i32>,
    #[serde(rename = "playtime", default, deserialize_with = "playtime")]
    pub playtime_hours: i32,
}

impl CatalogItem {
    pub fn display_rating(&self) -> String {
        format!("{:.2}", self.rating)
    }

    pub fn display_release_date(&self) -> &str {
        self.release_date.as_deref().unwrap_or("TBA")
    }
}

/// One page of results from the list or search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub count: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<CatalogItem>,
}

impl CatalogPage {
    /// Heuristic end-of-data signal: a short or empty page means no more.
    ///
    /// A provider whose total is an exact multiple of [`PAGE_SIZE`] yields one
    /// extra (empty) request before this turns false.
    pub fn has_more(&self) -> bool {
        !self.results.is_empty() && self.results.len() >= PAGE_SIZE
    }
}

#[derive(Deserialize)]
struct NamedRef {
    name: Option<String>,
}

fn genre_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let genres: Vec<NamedRef> = null_as_empty(deserializer)?;
    Ok(genres.into_iter().filter_map(|g| g.name).collect())
}

fn age_rating_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NamedRef>::deserialize(deserializer)?.and_then(|r| r.name))
}

pub(crate) fn playtime<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(0))
}
