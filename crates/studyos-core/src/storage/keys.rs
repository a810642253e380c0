//! Namespaced document keys
//!
//! Every document lives under its own key. There is no referential
//! integrity between keys.

use std::fmt;

/// Prefix shared by all document keys
pub const KEY_NAMESPACE: &str = "studyos";

/// The independent documents persisted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKey {
    Subjects,
    Schedule,
    Journal,
    Habits,
    Gre,
    SavedContent,
    AgentHistory,
    User,
    Settings,
}

impl DocumentKey {
    /// All keys, in backup order
    pub const ALL: [DocumentKey; 9] = [
        DocumentKey::Subjects,
        DocumentKey::Schedule,
        DocumentKey::Journal,
        DocumentKey::Habits,
        DocumentKey::Gre,
        DocumentKey::SavedContent,
        DocumentKey::AgentHistory,
        DocumentKey::User,
        DocumentKey::Settings,
    ];

    /// Field name used for this document inside a backup bundle
    pub fn backup_field(&self) -> &'static str {
        match self {
            DocumentKey::Subjects => "subjects",
            DocumentKey::Schedule => "schedule",
            DocumentKey::Journal => "journal",
            DocumentKey::Habits => "habits",
            DocumentKey::Gre => "gre",
            DocumentKey::SavedContent => "savedContent",
            DocumentKey::AgentHistory => "agentHistory",
            DocumentKey::User => "user",
            DocumentKey::Settings => "settings",
        }
    }

    /// Full namespaced storage key, e.g. `studyos.subjects`
    pub fn storage_key(&self) -> String {
        format!("{}.{}", KEY_NAMESPACE, self.backup_field())
    }

    /// Reverse of [`DocumentKey::storage_key`]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        let field = key.strip_prefix(KEY_NAMESPACE)?.strip_prefix('.')?;
        Self::ALL.into_iter().find(|k| k.backup_field() == field)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
