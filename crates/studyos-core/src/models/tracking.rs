//! Journal entries, habit logs and the user profile

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One journal entry per day
pub type Journal = BTreeMap<NaiveDate, JournalEntry>;

/// Free-form journal fields for a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub last_updated: DateTime<Utc>,
}

/// `date -> habit name -> check`
pub type HabitLog = BTreeMap<NaiveDate, BTreeMap<String, HabitCheck>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCheck {
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

/// The single user profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_study_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_study_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Fields this crate does not interpret, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// JSON names of the typed fields; these never appear in `extra`
    pub const FIELD_NAMES: [&'static str; 6] = [
        "name",
        "currentStreak",
        "longestStreak",
        "lastStudyDate",
        "totalStudyHours",
        "lastUpdated",
    ];

    pub fn is_typed_field(key: &str) -> bool {
        Self::FIELD_NAMES.contains(&key)
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub total_study_hours: Option<f64>,
    /// Extra fields to set (a null value removes the field)
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_entry_keeps_free_form_fields() {
        let entry: JournalEntry = serde_json::from_str(
            r#"{"mood":"focused","wins":["finished set 3"],"lastUpdated":"2026-03-01T21:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(entry.fields["mood"], "focused");
        assert!(!entry.fields.contains_key("lastUpdated"));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["wins"][0], "finished set 3");
        assert_eq!(json["lastUpdated"], "2026-03-01T21:00:00Z");
    }

    #[test]
    fn test_profile_preserves_unknown_fields() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"currentStreak":4,"longestStreak":9,"lastStudyDate":"2026-03-01","theme":"dark"}"#,
        )
        .unwrap();

        assert_eq!(profile.current_streak, 4);
        assert_eq!(profile.extra["theme"], "dark");

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["lastStudyDate"], "2026-03-01");
    }

    #[test]
    fn test_typed_fields_never_land_in_extra() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"name":"Sam","currentStreak":2,"longestStreak":3,"lastStudyDate":"2026-03-01","totalStudyHours":4.5,"lastUpdated":"2026-03-01T09:00:00Z","theme":"dark"}"#,
        )
        .unwrap();

        assert!(profile.last_updated.is_some());
        assert_eq!(profile.extra.len(), 1);
        for key in UserProfile::FIELD_NAMES {
            assert!(UserProfile::is_typed_field(key));
            assert!(!profile.extra.contains_key(key));
        }
        assert!(!UserProfile::is_typed_field("theme"));
    }

    #[test]
    fn test_empty_profile_defaults() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, UserProfile::default());
    }
}
