//! External content importers
//!
//! Normalizes YouTube video lists and saved-post scraper output into
//! [`SavedContentItem`]s and merges them into the saved-content document.
//! Merging is a set union on item id per platform: ids already stored are
//! skipped, so importing the same file twice changes nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreResult;
use crate::models::{Platform, SavedContent, SavedContentItem};
use crate::services::VideoSource;
use crate::storage::DocumentKey;
use crate::store::Store;

/// A video as returned by the YouTube data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeVideo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// One record of saved-post scraper output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedItem {
    pub id: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, alias = "caption")]
    pub title: String,
    pub saved_at: Option<DateTime<Utc>>,
    pub platform: Platform,
    #[serde(default)]
    pub watched: bool,
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// New items stored
    pub imported: usize,
    /// Items already present, duplicated in the input or missing an id
    pub skipped: usize,
    /// Items stored for the imported platforms afterwards
    pub total: usize,
}

/// `M:SS` stand-in for a video whose duration is unknown
///
/// Derived from the id so re-importing a video yields the same value.
pub fn placeholder_duration(video_id: &str) -> String {
    let hash = video_id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let minutes = 3 + hash % 25;
    let seconds = (hash / 25) % 60;
    format!("{}:{:02}", minutes, seconds)
}

impl YoutubeVideo {
    fn into_item(self, now: DateTime<Utc>) -> SavedContentItem {
        let duration = self
            .duration
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| placeholder_duration(&self.id));
        let thumbnail = self
            .thumbnail
            .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id));
        let channel = (!self.channel_title.is_empty()).then_some(self.channel_title);

        SavedContentItem {
            url: format!("https://www.youtube.com/watch?v={}", self.id),
            id: self.id,
            platform: Platform::Youtube,
            title: self.title,
            thumbnail,
            content_type: "video".to_string(),
            channel,
            duration: Some(duration),
            watched: false,
            saved_at: self.published_at.unwrap_or(now),
        }
    }
}

impl ScrapedItem {
    fn into_item(self, now: DateTime<Utc>) -> SavedContentItem {
        SavedContentItem {
            id: self.id,
            platform: self.platform,
            url: self.url,
            title: self.title,
            thumbnail: self.thumbnail,
            content_type: self.content_type,
            channel: None,
            duration: None,
            watched: self.watched,
            saved_at: self.saved_at.unwrap_or(now),
        }
    }
}

/// Union `incoming` into `content`, keyed by platform and id
fn merge(content: &mut SavedContent, incoming: Vec<SavedContentItem>) -> ImportSummary {
    let mut summary = ImportSummary::default();
    let mut platforms = HashSet::new();

    for item in incoming {
        platforms.insert(item.platform);
        if item.id.trim().is_empty() {
            warn!("Skipping {} item without an id", item.platform);
            summary.skipped += 1;
            continue;
        }

        let items = content.items_mut(item.platform);
        if items.iter().any(|existing| existing.id == item.id) {
            summary.skipped += 1;
        } else {
            items.push(item);
            summary.imported += 1;
        }
    }

    summary.total = platforms.iter().map(|p| content.items(*p).len()).sum();
    summary
}

impl Store {
    /// Merge YouTube videos into saved content
    pub fn import_from_youtube(&self, videos: Vec<YoutubeVideo>) -> CoreResult<ImportSummary> {
        let now = Utc::now();
        let incoming: Vec<_> = videos.into_iter().map(|v| v.into_item(now)).collect();

        let summary = self.transact(DocumentKey::SavedContent, |content: &mut SavedContent| {
            let mut summary = merge(content, incoming);
            summary.total = content.youtube.len();
            Ok(summary)
        })?;

        info!(
            "Imported {} YouTube video(s), skipped {}",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    /// Merge scraper output into the matching platform lists
    pub fn import_scraped(&self, items: Vec<ScrapedItem>) -> CoreResult<ImportSummary> {
        let now = Utc::now();
        let incoming: Vec<_> = items.into_iter().map(|i| i.into_item(now)).collect();

        let summary = self.transact(DocumentKey::SavedContent, |content: &mut SavedContent| {
            Ok(merge(content, incoming))
        })?;

        info!(
            "Imported {} saved item(s), skipped {}",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    /// Fetch videos from `source` and import them
    ///
    /// A failing source is logged and yields an empty summary.
    pub async fn import_from_source(&self, source: &dyn VideoSource) -> ImportSummary {
        match source.fetch_videos().await {
            Ok(videos) => self.import_from_youtube(videos).unwrap_or_else(|e| {
                warn!("Failed to store fetched videos: {}", e);
                ImportSummary::default()
            }),
            Err(e) => {
                warn!("Failed to fetch videos: {}", e);
                ImportSummary::default()
            }
        }
    }
}
