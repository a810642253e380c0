//! Daily schedule blocks

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Blocks grouped by day, each day sorted by start time
pub type Schedule = BTreeMap<NaiveDate, Vec<ScheduleBlock>>;

/// A planned activity on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: String,
    /// Start time, stored as `HH:mm`
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub activity: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    /// Minutes
    pub duration: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for adding a block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewScheduleBlock {
    /// `HH:mm`
    pub time: String,
    pub activity: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub duration: u32,
}

impl NewScheduleBlock {
    pub fn new(time: impl Into<String>, activity: impl Into<String>, duration: u32) -> Self {
        Self {
            time: time.into(),
            activity: activity.into(),
            block_type: "study".to_string(),
            duration,
        }
    }
}

/// Parse `HH:mm` (seconds tolerated)
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:mm", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("23:05:10"), NaiveTime::from_hms_opt(23, 5, 10));
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("noon").is_none());
    }

    #[test]
    fn test_block_time_serializes_as_hhmm() {
        let block = ScheduleBlock {
            id: "b1".into(),
            time: NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
            activity: "Flashcards".into(),
            block_type: "review".into(),
            duration: 30,
            completed: false,
            completed_at: None,
        };

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["time"], "07:05");
        assert_eq!(json["type"], "review");

        let back: ScheduleBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_schedule_keys_are_iso_dates() {
        let mut schedule = Schedule::new();
        schedule.insert(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), Vec::new());

        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"{"2026-03-09":[]}"#);
    }
}
