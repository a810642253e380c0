//! Import command handlers

use std::path::Path;

use anyhow::{Context, Result};

use studyos_core::{ScrapedItem, Store, YoutubeVideo};

use super::read_json;
use crate::output::Output;

/// Import a JSON array of YouTube videos
pub fn youtube(store: &Store, path: &Path, output: &Output) -> Result<()> {
    let videos: Vec<YoutubeVideo> = read_json(path)?;
    let summary = store
        .import_from_youtube(videos)
        .context("Failed to import videos")?;
    output.print_import(&summary)
}

/// Import saved-post scraper output
pub fn scraped(store: &Store, path: &Path, output: &Output) -> Result<()> {
    let items: Vec<ScrapedItem> = read_json(path)?;
    let summary = store
        .import_scraped(items)
        .context("Failed to import saved items")?;
    output.print_import(&summary)
}
