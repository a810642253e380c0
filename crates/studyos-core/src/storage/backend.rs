//! Key/value backends
//!
//! A backend stores one JSON string per key and accounts for the bytes it
//! holds. When a quota is set, a write that would push total usage past it
//! is refused with [`StorageError::QuotaExceeded`] and nothing changes.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use super::error::{StorageError, StorageResult};

/// Synchronous string key/value storage
pub trait Backend: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` (missing keys are not an error)
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys, sorted
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Bytes stored under `key`, 0 if absent
    fn size_of(&self, key: &str) -> StorageResult<u64>;

    /// Total bytes stored
    fn usage(&self) -> StorageResult<u64>;

    /// Byte quota, if any
    fn quota(&self) -> Option<u64>;
}

/// Check that replacing `key` with `requested` bytes stays within `quota`
pub(crate) fn ensure_capacity(
    quota: Option<u64>,
    key: &str,
    usage: u64,
    existing: u64,
    requested: u64,
) -> StorageResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let available = quota.saturating_sub(usage.saturating_sub(existing));
    if requested > available {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            requested,
            available,
        });
    }
    Ok(())
}

/// In-memory backend
///
/// Used by tests and for embedding the store without touching disk.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<u64>,
}

impl MemoryBackend {
    /// Create an unbounded in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory backend that refuses writes past `quota` bytes
    pub fn with_quota(quota: u64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries();
        let usage: u64 = entries.values().map(|v| v.len() as u64).sum();
        let existing = entries.get(key).map(|v| v.len() as u64).unwrap_or(0);
        ensure_capacity(self.quota, key, usage, existing, value.len() as u64)?;

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries().keys().cloned().collect())
    }

    fn size_of(&self, key: &str) -> StorageResult<u64> {
        Ok(self.entries().get(key).map(|v| v.len() as u64).unwrap_or(0))
    }

    fn usage(&self) -> StorageResult<u64> {
        Ok(self.entries().values().map(|v| v.len() as u64).sum())
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}
