//! Journal and habit mutators

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};

use super::required;
use crate::error::CoreResult;
use crate::models::{HabitCheck, HabitLog, Journal, JournalEntry};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// Journal entry for a day
    pub fn journal_entry(&self, date: NaiveDate) -> Option<JournalEntry> {
        let mut journal: Journal = self.read(DocumentKey::Journal);
        journal.remove(&date)
    }

    /// Write the entry for `date`, replacing any previous one
    pub fn save_journal_entry(&self, date: NaiveDate, mut fields: Map<String, Value>) -> CoreResult<JournalEntry> {
        fields.remove("lastUpdated");
        let entry = JournalEntry {
            fields,
            last_updated: Utc::now(),
        };

        self.transact(DocumentKey::Journal, |journal: &mut Journal| {
            journal.insert(date, entry.clone());
            Ok(entry)
        })
    }

    /// Habit checks logged on `date`
    pub fn habits_for(&self, date: NaiveDate) -> BTreeMap<String, HabitCheck> {
        let mut habits: HabitLog = self.read(DocumentKey::Habits);
        habits.remove(&date).unwrap_or_default()
    }

    /// Record whether a habit was done on `date`
    pub fn log_habit(&self, date: NaiveDate, name: &str, completed: bool) -> CoreResult<HabitCheck> {
        let name = required(name, "Habit name is required")?;
        let check = HabitCheck {
            completed,
            timestamp: Utc::now(),
        };

        self.transact(DocumentKey::Habits, |habits: &mut HabitLog| {
            habits.entry(date).or_default().insert(name, check.clone());
            Ok(check)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_journal_entry_is_overwritten() {
        let store = Store::in_memory();
        store
            .save_journal_entry(date(), fields(json!({"mood": "tired", "wins": []})))
            .unwrap();
        store
            .save_journal_entry(date(), fields(json!({"mood": "focused"})))
            .unwrap();

        let entry = store.journal_entry(date()).unwrap();
        assert_eq!(entry.fields["mood"], "focused");
        assert!(!entry.fields.contains_key("wins"));
        assert!(store.journal_entry(date().pred_opt().unwrap()).is_none());
    }

    #[test]
    fn test_journal_ignores_supplied_timestamp() {
        let store = Store::in_memory();
        let entry = store
            .save_journal_entry(
                date(),
                fields(json!({"lastUpdated": "1999-01-01T00:00:00Z", "note": "x"})),
            )
            .unwrap();

        assert!(!entry.fields.contains_key("lastUpdated"));
        assert!(entry.last_updated.timestamp() > 946_684_800);
    }

    #[test]
    fn test_log_habits() {
        let store = Store::in_memory();
        store.log_habit(date(), "Read", true).unwrap();
        store.log_habit(date(), "Exercise", false).unwrap();
        store.log_habit(date(), "Read", false).unwrap();

        let habits = store.habits_for(date());
        assert_eq!(habits.len(), 2);
        assert!(!habits["Read"].completed);
        assert!(store.habits_for(date().succ_opt().unwrap()).is_empty());

        assert!(store.log_habit(date(), "  ", true).is_err());
    }
}
