//! Storage layer
//!
//! Handles JSON document persistence under namespaced keys.
//!
//! ## Architecture
//!
//! - **Backend**: string key/value storage with quota accounting
//!   (file-per-key on disk, or in memory)
//! - **DocumentStorage**: typed JSON save/load plus backup export/import
//!
//! Each document is written whole; there are no partial updates.

mod backend;
mod backup;
mod documents;
pub mod error;
mod keys;
pub mod persistence;

pub use backend::{Backend, MemoryBackend};
pub use backup::BACKUP_VERSION;
pub use documents::{format_bytes, DocumentStorage, StorageStats};
pub use error::{StorageError, StorageResult};
pub use keys::{DocumentKey, KEY_NAMESPACE};
pub use persistence::FileBackend;
