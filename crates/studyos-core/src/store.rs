//! Unified storage interface
//!
//! The `Store` is a cheap, cloneable handle over one shared backend. Every
//! clone sees the same documents, the way every tab of a browser sees the
//! same local storage.
//!
//! ## Mutations
//!
//! All mutators go through [`Store::transact`]: load the whole document for
//! a key, apply a validated change to the in-memory copy, write the whole
//! document back, then publish a change notification for the key. Nothing
//! is locked between the load and the write, so two interleaved
//! transactions on the same key resolve as last-write-wins.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! let subject = store.add_subject(NewSubject::new("Physics", exam_date))?;
//! store.add_topic(&subject.id, NewTopic::new("Optics"))?;
//!
//! let progress = store.overall_progress();
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::Config;
use crate::error::CoreResult;
use crate::models::Subject;
use crate::storage::{
    Backend, DocumentKey, DocumentStorage, FileBackend, MemoryBackend, StorageError,
    StorageStats,
};

/// Buffered change notifications per subscriber
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Unified storage interface for studyos
#[derive(Clone)]
pub struct Store {
    /// Typed document access
    documents: DocumentStorage,
    /// Change notifications, one message per written key
    changes: broadcast::Sender<DocumentKey>,
    /// Configuration
    config: Arc<Config>,
}

impl Store {
    /// Open the file-backed store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the file-backed store with a specific configuration
    pub fn open_with_config(config: Config) -> Self {
        let backend = FileBackend::new(&config);
        Self::with_backend(Arc::new(backend), config)
    }

    /// Store kept entirely in memory, with no quota
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), Config::default())
    }

    /// Store over any backend
    pub fn with_backend(backend: Arc<dyn Backend>, config: Config) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            documents: DocumentStorage::new(backend),
            changes,
            config: Arc::new(config),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Typed access to the underlying documents
    pub fn documents(&self) -> &DocumentStorage {
        &self.documents
    }

    /// Today's date in the user's time zone
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    // ==================== Transactions ====================

    /// Run one read-modify-write against the document under `key`
    ///
    /// `mutate` receives the current document (or `D::default()` when none
    /// is stored). If it returns an error nothing is written. A stored
    /// document that cannot be parsed aborts the transaction instead of being
    /// replaced.
    pub fn transact<D, T, F>(&self, key: DocumentKey, mutate: F) -> CoreResult<T>
    where
        D: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut D) -> CoreResult<T>,
    {
        let mut doc: D = self.documents.load(key)?.unwrap_or_default();
        let output = mutate(&mut doc)?;
        self.documents.save(key, &doc)?;
        debug!("Committed transaction on {}", key);
        self.publish(key);
        Ok(output)
    }

    /// Read the document under `key`, defaulting when missing or unreadable
    pub fn read<D>(&self, key: DocumentKey) -> D
    where
        D: DeserializeOwned + Default,
    {
        self.documents.load_or(key, D::default())
    }

    /// Read the document under `key`, reporting storage and parse errors
    pub fn read_strict<D>(&self, key: DocumentKey) -> CoreResult<D>
    where
        D: DeserializeOwned + Default,
    {
        Ok(self.documents.load(key)?.unwrap_or_default())
    }

    // ==================== Change notifications ====================

    /// Subscribe to keys written from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentKey> {
        self.changes.subscribe()
    }

    fn publish(&self, key: DocumentKey) {
        // No subscribers is fine
        let _ = self.changes.send(key);
    }

    // ==================== Opaque documents ====================

    /// Raw JSON of a document the core does not interpret (GRE progress,
    /// agent history, settings)
    pub fn load_document(&self, key: DocumentKey) -> CoreResult<Option<Value>> {
        Ok(self.documents.load(key)?)
    }

    /// Replace a document wholesale
    pub fn save_document(&self, key: DocumentKey, value: &Value) -> CoreResult<()> {
        self.documents.save(key, value)?;
        self.publish(key);
        Ok(())
    }

    // ==================== Backup ====================

    /// Bundle every document into a backup object
    pub fn export_all_data(&self) -> CoreResult<Value> {
        Ok(self.documents.export_all()?)
    }

    /// Backup as pretty JSON text
    pub fn export_to_string(&self) -> CoreResult<String> {
        Ok(self.documents.export_to_string()?)
    }

    /// Restore a backup object; returns the restored keys
    ///
    /// The subjects document is checked before anything is written, so a
    /// bundle with out-of-range mastery is refused as a whole.
    pub fn import_data(&self, bundle: &Value) -> CoreResult<Vec<DocumentKey>> {
        check_subjects(bundle)?;
        let restored = self.documents.import_all(bundle)?;
        for key in &restored {
            self.publish(*key);
        }
        Ok(restored)
    }

    /// Parse and restore backup text
    pub fn import_from_str(&self, text: &str) -> CoreResult<Vec<DocumentKey>> {
        let bundle: Value = serde_json::from_str(text)
            .map_err(|e| StorageError::InvalidBackup(format!("not valid JSON: {}", e)))?;
        self.import_data(&bundle)
    }

    // ==================== Stats ====================

    /// Bytes used and quota
    pub fn storage_stats(&self) -> CoreResult<StorageStats> {
        Ok(self.documents.stats()?)
    }
}

fn check_subjects(bundle: &Value) -> Result<(), StorageError> {
    let field = DocumentKey::Subjects.backup_field();
    let Some(value) = bundle.get(field).filter(|v| !v.is_null()) else {
        return Ok(());
    };

    let subjects = Vec::<Subject>::deserialize(value)
        .map_err(|e| StorageError::InvalidBackup(format!("{}: {}", field, e)))?;
    for subject in &subjects {
        if let Some(topic) = subject.topics.iter().find(|t| t.mastery > 100) {
            return Err(StorageError::InvalidBackup(format!(
                "{}: mastery {} of topic '{}' in '{}' is outside 0-100",
                field, topic.mastery, topic.id, subject.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::models::{NewSubject, NewTopic, Subject};
    use chrono::Duration;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            quota_bytes: 0,
            refresh_interval_ms: 0,
            log_file: None,
        }
    }

    fn exam_in(days: i64) -> NaiveDate {
        Local::now().date_naive() + Duration::days(days)
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let id = {
            let store = Store::open_with_config(config.clone());
            let subject = store.add_subject(NewSubject::new("Physics", exam_in(30))).unwrap();
            store.add_topic(&subject.id, NewTopic::new("Optics")).unwrap();
            subject.id
        };

        let store = Store::open_with_config(config);
        let subject = store.get_subject(&id).unwrap();
        assert_eq!(subject.name, "Physics");
        assert_eq!(subject.topics.len(), 1);
        assert!(temp_dir.path().join("studyos.subjects.json").exists());
    }

    #[test]
    fn test_clones_share_documents() {
        let store = Store::in_memory();
        let other = store.clone();

        store.add_subject(NewSubject::new("Chemistry", exam_in(10))).unwrap();
        assert_eq!(other.subjects().len(), 1);
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let store = Store::in_memory();
        store.add_subject(NewSubject::new("Physics", exam_in(5))).unwrap();
        let before = store.documents().load_raw(DocumentKey::Subjects).unwrap();

        let result: CoreResult<()> = store.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            subjects.clear();
            Err(CoreError::validation("nope"))
        });

        assert!(result.is_err());
        assert_eq!(store.documents().load_raw(DocumentKey::Subjects).unwrap(), before);
    }

    #[test]
    fn test_corrupt_document_is_not_overwritten() {
        let store = Store::in_memory();
        store
            .documents()
            .save_raw(DocumentKey::Subjects, "{broken")
            .unwrap();

        let err = store
            .add_subject(NewSubject::new("Physics", exam_in(5)))
            .unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert_eq!(
            store.documents().load_raw(DocumentKey::Subjects).unwrap().as_deref(),
            Some("{broken")
        );

        // Lenient reads fall back to empty
        assert!(store.subjects().is_empty());
    }

    #[test]
    fn test_interleaved_transactions_last_write_wins() {
        let store = Store::in_memory();
        let subject = store.add_subject(NewSubject::new("Physics", exam_in(30))).unwrap();

        // The outer writer works from a snapshot taken before the inner one
        // commits, so the inner topic is lost when the outer one writes.
        store
            .transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
                store.add_topic(&subject.id, NewTopic::new("Optics"))?;
                subjects[0].color = "#000000".to_string();
                Ok(())
            })
            .unwrap();

        let after = store.get_subject(&subject.id).unwrap();
        assert_eq!(after.color, "#000000");
        assert!(after.topics.is_empty());
    }

    #[test]
    fn test_transactions_publish_changes() {
        let store = Store::in_memory();
        let mut changes = store.subscribe();

        store.log_habit(exam_in(0), "Read", true).unwrap();
        assert_eq!(changes.try_recv().unwrap(), DocumentKey::Habits);
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_quota_exceeded_surfaces_and_keeps_document() {
        let store = Store::with_backend(Arc::new(MemoryBackend::with_quota(600)), Config::default());
        let subject = store.add_subject(NewSubject::new("Physics", exam_in(30))).unwrap();
        let before = store.documents().load_raw(DocumentKey::Subjects).unwrap();

        let long_notes = "x".repeat(1_000);
        let mut result = Ok(());
        for i in 0..3 {
            let topic = NewTopic {
                name: format!("Topic {}", i),
                notes: long_notes.clone(),
                ..NewTopic::default()
            };
            if let Err(e) = store.add_topic(&subject.id, topic) {
                result = Err(e);
                break;
            }
        }

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "quota_exceeded");
        assert_eq!(store.documents().load_raw(DocumentKey::Subjects).unwrap(), before);
    }

    #[test]
    fn test_opaque_documents() {
        let store = Store::in_memory();
        assert!(store.load_document(DocumentKey::Gre).unwrap().is_none());

        let gre = json!({"verbal": 158, "quant": 165});
        store.save_document(DocumentKey::Gre, &gre).unwrap();
        assert_eq!(store.load_document(DocumentKey::Gre).unwrap(), Some(gre));
    }

    #[test]
    fn test_export_import_round_trip() {
        let store = Store::in_memory();
        let subject = store.add_subject(NewSubject::new("Physics", exam_in(30))).unwrap();
        let topic = store.add_topic(&subject.id, NewTopic::new("Optics")).unwrap();
        store
            .mark_revision_complete(&subject.id, &topic.id, "r1")
            .unwrap();
        store.update_streak().unwrap();
        store
            .save_document(DocumentKey::Settings, &json!({"theme": "dark", "a": [1, 2.5]}))
            .unwrap();

        let before: Vec<_> = DocumentKey::ALL
            .iter()
            .map(|k| store.documents().load_raw(*k).unwrap())
            .collect();

        let bundle = store.export_all_data().unwrap();

        let fresh = Store::in_memory();
        let restored = fresh.import_data(&bundle).unwrap();
        assert!(restored.contains(&DocumentKey::Subjects));

        let after: Vec<_> = DocumentKey::ALL
            .iter()
            .map(|k| fresh.documents().load_raw(*k).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_import_refuses_out_of_range_mastery() {
        let store = Store::in_memory();
        let subject = store.add_subject(NewSubject::new("Physics", exam_in(30))).unwrap();
        let before = store.documents().load_raw(DocumentKey::Subjects).unwrap();

        for mastery in [150, 300] {
            let bundle = json!({
                "version": "1.0",
                "exportDate": "2026-01-01T00:00:00.000Z",
                "subjects": [{
                    "id": "chem",
                    "name": "Chemistry",
                    "status": "active",
                    "startDate": "2026-01-01",
                    "examDate": "2026-06-01",
                    "topics": [{"id": "acids", "name": "Acids", "mastery": mastery}]
                }],
                "settings": {"theme": "dark"}
            });

            let err = store.import_data(&bundle).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Storage(StorageError::InvalidBackup(_))
            ));
            assert_eq!(store.documents().load_raw(DocumentKey::Subjects).unwrap(), before);
            assert!(store.documents().load_raw(DocumentKey::Settings).unwrap().is_none());
        }

        // Subject mutators still work on the untouched document
        store.add_topic(&subject.id, NewTopic::new("Optics")).unwrap();
    }

    #[test]
    fn test_import_from_str_checks_subjects() {
        let store = Store::in_memory();
        let text = r#"{"version":"1.0","exportDate":"2026-01-01T00:00:00.000Z","subjects":[{"id":"chem","name":"Chemistry","status":"active","startDate":"2026-01-01","examDate":"2026-06-01","topics":[{"id":"acids","name":"Acids","mastery":101}]}]}"#;

        assert!(store.import_from_str(text).is_err());
        assert!(store.import_from_str("not a backup").is_err());
        assert!(store.documents().load_raw(DocumentKey::Subjects).unwrap().is_none());
    }

    #[test]
    fn test_storage_stats() {
        let store = Store::in_memory();
        store.log_habit(exam_in(0), "Read", true).unwrap();

        let stats = store.storage_stats().unwrap();
        assert!(stats.used_bytes > 0);
        assert_eq!(stats.documents.len(), 1);
        assert!(stats.quota_bytes.is_none());
    }
}
