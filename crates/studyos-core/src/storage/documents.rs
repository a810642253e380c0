//! Typed JSON documents on top of a [`Backend`]

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::backend::Backend;
use super::error::{StorageError, StorageResult};
use super::keys::DocumentKey;

/// Storage usage summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    /// Bytes currently stored
    pub used_bytes: u64,
    /// Byte quota, if the backend has one
    pub quota_bytes: Option<u64>,
    /// Per-document sizes, for documents that exist
    pub documents: Vec<(String, u64)>,
}

impl StorageStats {
    /// Fraction of the quota in use (0.0 without a quota)
    pub fn usage_ratio(&self) -> f64 {
        match self.quota_bytes {
            Some(q) if q > 0 => self.used_bytes as f64 / q as f64,
            _ => 0.0,
        }
    }

    /// Human-readable used size
    pub fn used_human(&self) -> String {
        format_bytes(self.used_bytes)
    }
}

/// Format a byte count as B / KB / MB
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// JSON document persistence keyed by [`DocumentKey`]
#[derive(Clone)]
pub struct DocumentStorage {
    backend: Arc<dyn Backend>,
}

impl DocumentStorage {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The underlying backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Serialize `value` and store it under `key`
    pub fn save<T: Serialize + ?Sized>(&self, key: DocumentKey, value: &T) -> StorageResult<()> {
        let storage_key = key.storage_key();
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: storage_key.clone(),
            source,
        })?;
        self.backend.set(&storage_key, &json)?;
        debug!("Saved {} ({} bytes)", storage_key, json.len());
        Ok(())
    }

    /// Load the document under `key`
    ///
    /// Returns `None` when nothing is stored and `InvalidFormat` when the
    /// stored JSON does not match `T`.
    pub fn load<T: DeserializeOwned>(&self, key: DocumentKey) -> StorageResult<Option<T>> {
        let storage_key = key.storage_key();
        let Some(raw) = self.backend.get(&storage_key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::InvalidFormat {
                key: storage_key,
                details: e.to_string(),
            })
    }

    /// Load the document under `key`, falling back to `default`
    ///
    /// Missing, unreadable and unparseable documents all yield the default.
    pub fn load_or<T: DeserializeOwned>(&self, key: DocumentKey, default: T) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Falling back to default for {}: {}", key, e);
                default
            }
        }
    }

    /// Raw stored JSON for `key`
    pub fn load_raw(&self, key: DocumentKey) -> StorageResult<Option<String>> {
        self.backend.get(&key.storage_key())
    }

    /// Store raw JSON under `key` without interpreting it
    pub fn save_raw(&self, key: DocumentKey, json: &str) -> StorageResult<()> {
        self.backend.set(&key.storage_key(), json)
    }

    /// Remove the document under `key`
    pub fn remove(&self, key: DocumentKey) -> StorageResult<()> {
        self.backend.remove(&key.storage_key())
    }

    /// Current usage and quota
    pub fn stats(&self) -> StorageResult<StorageStats> {
        let mut documents = Vec::new();
        for key in DocumentKey::ALL {
            let storage_key = key.storage_key();
            let size = self.backend.size_of(&storage_key)?;
            if size > 0 {
                documents.push((storage_key, size));
            }
        }

        Ok(StorageStats {
            used_bytes: self.backend.usage()?,
            quota_bytes: self.backend.quota(),
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
    struct Counter {
        value: u32,
    }

    fn storage() -> DocumentStorage {
        DocumentStorage::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_save_and_load() {
        let storage = storage();
        storage.save(DocumentKey::Settings, &Counter { value: 3 }).unwrap();

        let loaded: Option<Counter> = storage.load(DocumentKey::Settings).unwrap();
        assert_eq!(loaded, Some(Counter { value: 3 }));
    }

    #[test]
    fn test_load_missing_is_none() {
        let loaded: Option<Counter> = storage().load(DocumentKey::Settings).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_or_falls_back_on_corrupt_json() {
        let storage = storage();
        storage.save_raw(DocumentKey::Settings, "{not json").unwrap();

        let strict: StorageResult<Option<Counter>> = storage.load(DocumentKey::Settings);
        assert!(matches!(strict, Err(StorageError::InvalidFormat { .. })));

        let lenient = storage.load_or(DocumentKey::Settings, Counter { value: 9 });
        assert_eq!(lenient, Counter { value: 9 });
    }

    #[test]
    fn test_quota_failure_is_distinct_from_serialization() {
        let storage = DocumentStorage::new(Arc::new(MemoryBackend::with_quota(4)));
        let err = storage
            .save(DocumentKey::Settings, &Counter { value: 12345 })
            .unwrap_err();
        assert!(err.is_quota_exceeded());

        // Maps with non-string keys cannot be JSON-encoded
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], 1u8);
        let err = storage.save(DocumentKey::Settings, &bad).unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[test]
    fn test_stats() {
        let storage = storage();
        storage.save_raw(DocumentKey::User, "{}").unwrap();
        storage.save_raw(DocumentKey::Subjects, "[]").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.used_bytes, 4);
        assert_eq!(stats.documents.len(), 2);
        assert_eq!(stats.usage_ratio(), 0.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
