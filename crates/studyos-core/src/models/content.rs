//! Saved external content (Instagram posts, YouTube videos)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
        })
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::Youtube),
            _ => Err(CoreError::validation(format!(
                "Invalid platform: {}. Expected instagram or youtube",
                s
            ))),
        }
    }
}

/// A saved post or video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContentItem {
    /// External id (post shortcode or video id)
    pub id: String,
    pub platform: Platform,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    /// post, reel, video, ...
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub watched: bool,
    pub saved_at: DateTime<Utc>,
}

/// Saved items per platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedContent {
    #[serde(default)]
    pub instagram: Vec<SavedContentItem>,
    #[serde(default)]
    pub youtube: Vec<SavedContentItem>,
}

impl SavedContent {
    pub fn items(&self, platform: Platform) -> &[SavedContentItem] {
        match platform {
            Platform::Instagram => &self.instagram,
            Platform::Youtube => &self.youtube,
        }
    }

    pub fn items_mut(&mut self, platform: Platform) -> &mut Vec<SavedContentItem> {
        match platform {
            Platform::Instagram => &mut self.instagram,
            Platform::Youtube => &mut self.youtube,
        }
    }

    pub fn len(&self) -> usize {
        self.instagram.len() + self.youtube.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unwatched(&self) -> impl Iterator<Item = &SavedContentItem> {
        self.instagram
            .iter()
            .chain(self.youtube.iter())
            .filter(|item| !item.watched)
    }
}
