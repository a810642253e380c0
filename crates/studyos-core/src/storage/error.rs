//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing would exceed the storage quota (or the disk is full)
    #[error("Storage quota exceeded writing '{key}' ({requested} bytes requested, {available} available)")]
    QuotaExceeded {
        key: String,
        requested: u64,
        available: u64,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Value could not be turned into JSON
    #[error("Failed to serialize '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored document exists but cannot be parsed
    #[error("Invalid document format in '{key}': {details}")]
    InvalidFormat { key: String, details: String },

    /// Backup bundle is missing required metadata or is not JSON
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.).
    /// A full disk is reported as `QuotaExceeded` so callers handle both the
    /// same way.
    pub fn from_io(error: io::Error, key: &str, path: PathBuf, requested: u64) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::QuotaExceeded {
                key: key.to_string(),
                requested,
                available: 0,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// True when the failure is a quota or disk-full condition
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::QuotaExceeded { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::InvalidFormat { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::QuotaExceeded { .. } => Some(
                "Export a backup (studyos backup export <file>), then delete archived subjects or old saved content.",
            ),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::InvalidFormat { .. } => Some(
                "The stored document could not be parsed. Restore it from a backup or remove the file to start fresh.",
            ),
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, "studyos.subjects", PathBuf::from("/test/path"), 10);

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, "studyos.user", PathBuf::from("/missing/file"), 0);

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_is_quota_exceeded() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, "studyos.journal", PathBuf::from("/full/disk"), 2048);

        assert!(err.is_quota_exceeded());
        assert!(err.is_recoverable());
        assert!(err
            .recovery_suggestion()
            .unwrap()
            .contains("backup export"));
    }

    #[test]
    fn test_quota_display_names_key() {
        let err = StorageError::QuotaExceeded {
            key: "studyos.savedContent".to_string(),
            requested: 900,
            available: 100,
        };

        let msg = err.to_string();
        assert!(msg.contains("quota exceeded"));
        assert!(msg.contains("studyos.savedContent"));
    }

    #[test]
    fn test_invalid_format_display() {
        let err = StorageError::InvalidFormat {
            key: "studyos.subjects".to_string(),
            details: "expected value at line 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Invalid document format"));
        assert!(!err.is_quota_exceeded());
    }
}
