//! Saved-content mutators

use crate::error::{CoreError, CoreResult};
use crate::models::{Platform, SavedContent, SavedContentItem};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// All saved posts and videos
    pub fn saved_content(&self) -> SavedContent {
        self.read(DocumentKey::SavedContent)
    }

    /// Flag an item as watched or unwatched
    pub fn mark_content_watched(
        &self,
        platform: Platform,
        id: &str,
        watched: bool,
    ) -> CoreResult<SavedContentItem> {
        self.transact(DocumentKey::SavedContent, |content: &mut SavedContent| {
            let item = content
                .items_mut(platform)
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| CoreError::not_found("Saved item", id))?;
            item.watched = watched;
            Ok(item.clone())
        })
    }

    /// Remove an item
    pub fn delete_saved_content(&self, platform: Platform, id: &str) -> CoreResult<SavedContentItem> {
        self.transact(DocumentKey::SavedContent, |content: &mut SavedContent| {
            let items = content.items_mut(platform);
            let position = items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| CoreError::not_found("Saved item", id))?;
            Ok(items.remove(position))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Store {
        let store = Store::in_memory();
        store
            .documents()
            .save(
                DocumentKey::SavedContent,
                &json!({
                    "instagram": [{
                        "id": "C1xyz", "platform": "instagram",
                        "url": "https://www.instagram.com/p/C1xyz/", "type": "reel",
                        "savedAt": "2026-02-01T10:00:00Z"
                    }],
                    "youtube": [{
                        "id": "dQw4w9WgXcQ", "platform": "youtube",
                        "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "type": "video",
                        "savedAt": "2026-02-02T10:00:00Z"
                    }]
                }),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_mark_watched() {
        let store = seeded();

        let item = store
            .mark_content_watched(Platform::Youtube, "dQw4w9WgXcQ", true)
            .unwrap();
        assert!(item.watched);
        assert_eq!(store.saved_content().unwatched().count(), 1);

        // Ids are looked up within the given platform only
        let err = store
            .mark_content_watched(Platform::Instagram, "dQw4w9WgXcQ", true)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_saved_content() {
        let store = seeded();

        store.delete_saved_content(Platform::Instagram, "C1xyz").unwrap();
        let content = store.saved_content();
        assert!(content.instagram.is_empty());
        assert_eq!(content.youtube.len(), 1);

        assert!(store.delete_saved_content(Platform::Instagram, "C1xyz").is_err());
    }
}
