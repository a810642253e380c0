//! Saved content command handlers

use anyhow::Result;

use studyos_core::{Platform, Store};

use crate::output::Output;

/// List saved items, optionally for one platform or only unwatched
pub fn list(store: &Store, platform: Option<Platform>, unwatched: bool, output: &Output) -> Result<()> {
    let content = store.saved_content();
    let items = content
        .instagram
        .iter()
        .chain(content.youtube.iter())
        .filter(|item| platform.map_or(true, |p| item.platform == p))
        .filter(|item| !unwatched || !item.watched);
    output.print_content(items)
}

pub fn watched(store: &Store, platform: Platform, id: &str, unset: bool, output: &Output) -> Result<()> {
    let item = store.mark_content_watched(platform, id, !unset)?;
    let state = if item.watched { "watched" } else { "unwatched" };
    output.success(&format!("Marked {} {}", item.id, state));
    Ok(())
}

pub fn delete(store: &Store, platform: Platform, id: &str, output: &Output) -> Result<()> {
    let item = store.delete_saved_content(platform, id)?;
    output.success(&format!("Removed {} item {}", item.platform, item.id));
    Ok(())
}
