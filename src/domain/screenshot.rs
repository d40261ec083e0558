use serde::Deserialize;

use super::null_as_empty;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Screenshot {
    pub id: i64,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScreenshotPage {
    #[serde(default)]
    pub count: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Screenshot>,
}
