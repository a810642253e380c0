//! Command handlers

pub mod backup;
pub mod config;
pub mod content;
pub mod import;
pub mod journal;
pub mod profile;
pub mod progress;
pub mod schedule;
pub mod status;
pub mod subject;
pub mod topic;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::de::DeserializeOwned;

/// Parse `today`, `tomorrow`, `yesterday`, `+N`/`-N` days or `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(offset) = s.strip_prefix('+').or_else(|| s.starts_with('-').then_some(s)) {
        if let Ok(days) = offset.parse::<i64>() {
            return Ok(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD, today or +N", s))
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
