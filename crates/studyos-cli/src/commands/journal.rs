//! Journal and habit command handlers

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};

use studyos_core::analytics::habit_streak;
use studyos_core::models::HabitLog;
use studyos_core::{DocumentKey, Store};

use crate::output::Output;

/// Build journal fields from `key=value` pairs
fn parse_fields(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid field '{}', expected key=value", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid field '{}', key is empty", pair);
        }
        // Allow structured values such as [1,2] or {"a":1}
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

pub fn save(store: &Store, date: NaiveDate, pairs: &[String], output: &Output) -> Result<()> {
    let fields = parse_fields(pairs)?;
    let entry = store.save_journal_entry(date, fields)?;
    output.success(&format!("Saved journal for {} ({} field(s))", date, entry.fields.len()));
    Ok(())
}

pub fn show(store: &Store, date: NaiveDate, output: &Output) -> Result<()> {
    let entry = store.journal_entry(date);
    output.print_journal(date, entry.as_ref())
}

pub fn log_habit(store: &Store, date: NaiveDate, name: &str, missed: bool, output: &Output) -> Result<()> {
    let check = store.log_habit(date, name, !missed)?;
    let verb = if check.completed { "done" } else { "missed" };
    output.success(&format!("{} marked {} on {}", name.trim(), verb, date));
    Ok(())
}

/// List habits logged on a day with their current streaks
pub fn list_habits(store: &Store, date: NaiveDate, output: &Output) -> Result<()> {
    let habits = store.habits_for(date);
    let log: HabitLog = store.read(DocumentKey::Habits);
    let streaks: BTreeMap<String, u32> = habits
        .keys()
        .map(|name| (name.clone(), habit_streak(&log, name, date)))
        .collect();
    output.print_habits(date, &habits, &streaks)
}
