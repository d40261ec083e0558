pub mod bookmark;
pub mod detail;
pub mod item;
pub mod resource;
pub mod screenshot;
pub mod user;

pub use bookmark::BookmarkRecord;
pub use detail::{CatalogDetail, PlatformEntry, Tag};
pub use item::{CatalogItem, CatalogPage, PAGE_SIZE};
pub use resource::Resource;
pub use screenshot::{Screenshot, ScreenshotPage};
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Deserialize a list field that the provider may send as `null` or omit.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
