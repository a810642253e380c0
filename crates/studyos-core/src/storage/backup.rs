//! Backup bundles
//!
//! A backup is one JSON object holding every stored document under its
//! backup field name, plus `version` and `exportDate`:
//!
//! ```text
//! {"version":"1.0","exportDate":"2026-01-05T10:00:00Z","subjects":[...],"user":{...}}
//! ```
//!
//! Documents that were never written are left out of the bundle, and a
//! bundle with missing documents restores the ones it has.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::documents::DocumentStorage;
use super::error::{StorageError, StorageResult};
use super::keys::DocumentKey;

/// Format version written into new backups
pub const BACKUP_VERSION: &str = "1.0";

const VERSION_FIELD: &str = "version";
const EXPORT_DATE_FIELD: &str = "exportDate";

impl DocumentStorage {
    /// Bundle every stored document into a backup object
    pub fn export_all(&self) -> StorageResult<Value> {
        let mut bundle = Map::new();
        bundle.insert(VERSION_FIELD.into(), Value::String(BACKUP_VERSION.into()));
        bundle.insert(
            EXPORT_DATE_FIELD.into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        for key in DocumentKey::ALL {
            let Some(raw) = self.load_raw(key)? else {
                continue;
            };
            let value: Value =
                serde_json::from_str(&raw).map_err(|e| StorageError::InvalidFormat {
                    key: key.storage_key(),
                    details: e.to_string(),
                })?;
            bundle.insert(key.backup_field().into(), value);
        }

        info!("Exported {} documents", bundle.len() - 2);
        Ok(Value::Object(bundle))
    }

    /// Export as pretty-printed JSON text, ready to write to a file
    pub fn export_to_string(&self) -> StorageResult<String> {
        let bundle = self.export_all()?;
        serde_json::to_string_pretty(&bundle).map_err(|source| StorageError::Serialization {
            key: "backup".into(),
            source,
        })
    }

    /// Restore documents from a backup object
    ///
    /// `version` and `exportDate` must both be present before anything is
    /// written. Each document present in the bundle replaces the stored one;
    /// absent or null documents are skipped. Returns the restored keys.
    pub fn import_all(&self, bundle: &Value) -> StorageResult<Vec<DocumentKey>> {
        let object = bundle
            .as_object()
            .ok_or_else(|| StorageError::InvalidBackup("backup must be a JSON object".into()))?;

        let version = object
            .get(VERSION_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| StorageError::InvalidBackup("missing version".into()))?;
        if object.get(EXPORT_DATE_FIELD).map_or(true, Value::is_null) {
            return Err(StorageError::InvalidBackup("missing exportDate".into()));
        }
        if version != BACKUP_VERSION {
            warn!(
                "Importing backup version {} (current is {})",
                version, BACKUP_VERSION
            );
        }

        let mut restored = Vec::new();
        for key in DocumentKey::ALL {
            let Some(value) = object.get(key.backup_field()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let json = serde_json::to_string(value).map_err(|source| {
                StorageError::Serialization {
                    key: key.storage_key(),
                    source,
                }
            })?;
            self.save_raw(key, &json)?;
            restored.push(key);
        }

        info!("Imported {} documents from backup", restored.len());
        Ok(restored)
    }

    /// Parse backup text and restore it
    pub fn import_from_str(&self, text: &str) -> StorageResult<Vec<DocumentKey>> {
        let bundle: Value = serde_json::from_str(text)
            .map_err(|e| StorageError::InvalidBackup(format!("not valid JSON: {}", e)))?;
        self.import_all(&bundle)
    }
}
