//! File-system document persistence
//!
//! Each document key is stored as `<data_dir>/<key>.json`. Writes are atomic
//! (write to temp file, then rename) so a crash leaves either the previous
//! document or the new one, never a partial file.
//!
//! Storage location: `~/.local/share/studyos/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::backend::{ensure_capacity, Backend};
use super::error::{StorageError, StorageResult};
use crate::config::Config;

/// Extension of document files
const DOCUMENT_EXTENSION: &str = "json";

/// Persistence backend writing one JSON file per key
pub struct FileBackend {
    data_dir: PathBuf,
    quota: Option<u64>,
}

impl FileBackend {
    /// Create a file backend from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            quota: config.quota(),
        }
    }

    /// Create a file backend rooted at `data_dir` with an optional quota
    pub fn at(data_dir: impl Into<PathBuf>, quota: Option<u64>) -> Self {
        Self {
            data_dir: data_dir.into(),
            quota,
        }
    }

    /// Directory holding the document files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `key`
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }

    /// Delete all stored documents
    ///
    /// Use with caution!
    pub fn delete_all(&self) -> StorageResult<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::ReadError { path, source })
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let requested = value.len() as u64;
        ensure_capacity(
            self.quota,
            key,
            self.usage()?,
            self.size_of(key)?,
            requested,
        )?;

        let path = self.document_path(key);
        atomic_write(&path, value.as_bytes())
            .map_err(|e| match e {
                StorageError::WriteError { source, path } => {
                    StorageError::from_io(source, key, path, requested)
                }
                other => other,
            })?;

        debug!("Wrote {} bytes to {:?}", requested, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.document_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StorageError::WriteError { path, source })?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.data_dir).map_err(|source| StorageError::ReadError {
            path: self.data_dir.clone(),
            source,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn size_of(&self, key: &str) -> StorageResult<u64> {
        let path = self.document_path(key);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(StorageError::ReadError { path, source }),
        }
    }

    fn usage(&self) -> StorageResult<u64> {
        let mut total = 0;
        for key in self.keys()? {
            total += self.size_of(&key)?;
        }
        Ok(total)
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Temp file in the same directory keeps the rename atomic
    let temp_path = path.with_extension("tmp");

    let write_temp = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };

    if let Err(source) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::WriteError {
            path: temp_path,
            source,
        });
    }

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_backend(temp_dir: &TempDir, quota: Option<u64>) -> FileBackend {
        FileBackend::at(temp_dir.path(), quota)
    }

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let backend = test_backend(&temp_dir, None);

        assert!(backend.get("studyos.subjects").unwrap().is_none());

        backend.set("studyos.subjects", "[]").unwrap();
        assert!(backend.document_path("studyos.subjects").exists());
        assert_eq!(
            backend.get("studyos.subjects").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_keys_skip_temp_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let backend = test_backend(&temp_dir, None);

        backend.set("studyos.user", "{}").unwrap();
        backend.set("studyos.habits", "{}").unwrap();
        fs::write(temp_dir.path().join("studyos.user.tmp"), "x").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(
            backend.keys().unwrap(),
            vec!["studyos.habits".to_string(), "studyos.user".to_string()]
        );
    }

    #[test]
    fn test_usage_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let backend = test_backend(&temp_dir, None);

        backend.set("a", "1234").unwrap();
        backend.set("b", "12").unwrap();
        assert_eq!(backend.usage().unwrap(), 6);

        backend.remove("a").unwrap();
        assert_eq!(backend.usage().unwrap(), 2);
        assert!(backend.get("a").unwrap().is_none());
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = test_backend(&temp_dir, Some(8));

        backend.set("a", "[1,2,3]").unwrap();
        let err = backend.set("a", "[1,2,3,4,5,6]").unwrap_err();

        assert!(err.is_quota_exceeded());
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_delete_all() {
        let temp_dir = TempDir::new().unwrap();
        let backend = test_backend(&temp_dir, None);

        backend.set("a", "1").unwrap();
        backend.set("b", "2").unwrap();
        backend.delete_all().unwrap();

        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.json");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_missing_data_dir_has_no_keys() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::at(temp_dir.path().join("nope"), None);
        assert!(backend.keys().unwrap().is_empty());
        assert_eq!(backend.usage().unwrap(), 0);
    }
}
