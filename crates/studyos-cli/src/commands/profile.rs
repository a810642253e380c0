//! Profile command handlers

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use studyos_core::{ProfileUpdate, Store};

use crate::output::Output;

pub fn show(store: &Store, output: &Output) -> Result<()> {
    output.print_profile(&store.user_profile())
}

/// Set a profile field; `none` clears it
pub fn set(store: &Store, key: &str, value: &str, output: &Output) -> Result<()> {
    let mut update = ProfileUpdate::default();
    match key {
        "name" => update.name = Some(if value == "none" { String::new() } else { value.to_string() }),
        "total_study_hours" | "totalStudyHours" => {
            update.total_study_hours = Some(
                value
                    .parse()
                    .with_context(|| format!("Invalid number of hours: {}", value))?,
            )
        }
        _ => {
            let value = match value {
                "none" => Value::Null,
                v => serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string())),
            };
            let mut extra = Map::new();
            extra.insert(key.to_string(), value);
            update.extra = extra;
        }
    }

    store.update_profile(update)?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Count today as a study day
pub fn streak(store: &Store, output: &Output) -> Result<()> {
    let profile = store.update_streak()?;
    output.success(&format!(
        "Streak: {} day(s), longest {}",
        profile.current_streak, profile.longest_streak
    ));
    if output.is_quiet() {
        println!("{}", profile.current_streak);
    }
    Ok(())
}
