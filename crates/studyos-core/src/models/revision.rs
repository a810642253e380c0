//! Spaced revision state of a topic
//!
//! A topic always has exactly three revision passes. They are stored as an
//! ordered array:
//!
//! ```text
//! [{"level":1,"completed":true,"completedAt":"..."},{"level":2,"completed":false},{"level":3,"completed":false}]
//! ```
//!
//! Two older shapes are still read and migrated on load: a flag record
//! `{"r1":true,"r2":false,"r3":false,"r1Date":"..."}` and an unlabelled array
//! `[{"completed":true,"date":"..."}, ...]`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;

/// One of the three revision passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RevisionLevel {
    First,
    Second,
    Third,
}

impl RevisionLevel {
    pub const ALL: [RevisionLevel; 3] = [
        RevisionLevel::First,
        RevisionLevel::Second,
        RevisionLevel::Third,
    ];

    /// 1, 2 or 3
    pub fn number(self) -> u8 {
        match self {
            RevisionLevel::First => 1,
            RevisionLevel::Second => 2,
            RevisionLevel::Third => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(RevisionLevel::First),
            2 => Some(RevisionLevel::Second),
            3 => Some(RevisionLevel::Third),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for RevisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.number())
    }
}

impl FromStr for RevisionLevel {
    type Err = CoreError;

    /// Accepts `r1`..`r3` (any case) or a bare `1`..`3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('r')
            .or_else(|| trimmed.strip_prefix('R'))
            .unwrap_or(trimmed);

        digits
            .parse::<u8>()
            .ok()
            .and_then(RevisionLevel::from_number)
            .ok_or_else(|| {
                CoreError::validation(format!(
                    "Invalid revision level: {}. Expected r1, r2 or r3",
                    s
                ))
            })
    }
}

impl Serialize for RevisionLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for RevisionLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u8::deserialize(deserializer)?;
        RevisionLevel::from_number(n)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid revision level {}", n)))
    }
}

/// State of a single revision pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    pub level: RevisionLevel,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl RevisionRecord {
    fn pending(level: RevisionLevel) -> Self {
        Self {
            level,
            completed: false,
            completed_at: None,
        }
    }
}

/// The three revision passes of a topic, always in level order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RevisionsRepr")]
pub struct Revisions {
    records: [RevisionRecord; 3],
}

impl Default for Revisions {
    fn default() -> Self {
        Self {
            records: RevisionLevel::ALL.map(RevisionRecord::pending),
        }
    }
}

impl Revisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: RevisionLevel) -> &RevisionRecord {
        &self.records[level.index()]
    }

    pub fn is_complete(&self, level: RevisionLevel) -> bool {
        self.get(level).completed
    }

    /// Mark a pass as done at `at`
    pub fn mark_complete(&mut self, level: RevisionLevel, at: DateTime<Utc>) {
        let record = &mut self.records[level.index()];
        record.completed = true;
        record.completed_at = Some(at);
    }

    pub fn completed_count(&self) -> usize {
        self.records.iter().filter(|r| r.completed).count()
    }

    /// First pass not yet completed
    pub fn next_due(&self) -> Option<RevisionLevel> {
        self.records.iter().find(|r| !r.completed).map(|r| r.level)
    }

    /// `[r1, r2, r3]` completion flags
    pub fn flags(&self) -> [bool; 3] {
        [
            self.records[0].completed,
            self.records[1].completed,
            self.records[2].completed,
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RevisionRecord> {
        self.records.iter()
    }
}

impl Serialize for Revisions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

/// Every shape revision state has been stored in
#[derive(Deserialize)]
#[serde(untagged)]
enum RevisionsRepr {
    Sequence(Vec<LooseRecord>),
    Flags(FlagRecord),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LooseRecord {
    #[serde(default)]
    level: Option<u8>,
    #[serde(default)]
    completed: bool,
    #[serde(default, alias = "date", deserialize_with = "lenient_timestamp")]
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct FlagRecord {
    #[serde(default)]
    r1: bool,
    #[serde(default)]
    r2: bool,
    #[serde(default)]
    r3: bool,
    #[serde(default, rename = "r1Date", deserialize_with = "lenient_timestamp")]
    r1_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "r2Date", deserialize_with = "lenient_timestamp")]
    r2_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "r3Date", deserialize_with = "lenient_timestamp")]
    r3_date: Option<DateTime<Utc>>,
}

impl From<RevisionsRepr> for Revisions {
    fn from(repr: RevisionsRepr) -> Self {
        let mut revisions = Revisions::default();
        match repr {
            RevisionsRepr::Sequence(entries) => {
                for (position, entry) in entries.into_iter().enumerate() {
                    let level = entry
                        .level
                        .and_then(RevisionLevel::from_number)
                        .or_else(|| u8::try_from(position + 1).ok().and_then(RevisionLevel::from_number));
                    let Some(level) = level else {
                        continue;
                    };
                    revisions.records[level.index()] = RevisionRecord {
                        level,
                        completed: entry.completed,
                        completed_at: entry.completed_at,
                    };
                }
            }
            RevisionsRepr::Flags(flags) => {
                let legacy = [
                    (flags.r1, flags.r1_date),
                    (flags.r2, flags.r2_date),
                    (flags.r3, flags.r3_date),
                ];
                for (level, (completed, completed_at)) in RevisionLevel::ALL.into_iter().zip(legacy) {
                    revisions.records[level.index()] = RevisionRecord {
                        level,
                        completed,
                        completed_at,
                    };
                }
            }
        }
        revisions
    }
}

/// Accept RFC 3339 strings, bare dates, epoch milliseconds or null
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| parse_timestamp(&v)))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("r1".parse::<RevisionLevel>().unwrap(), RevisionLevel::First);
        assert_eq!("R2".parse::<RevisionLevel>().unwrap(), RevisionLevel::Second);
        assert_eq!("3".parse::<RevisionLevel>().unwrap(), RevisionLevel::Third);

        for bad in ["r4", "r0", "", "rx", "first"] {
            let err = bad.parse::<RevisionLevel>().unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn test_default_is_three_pending_passes() {
        let revisions = Revisions::new();
        assert_eq!(revisions.flags(), [false, false, false]);
        assert_eq!(revisions.next_due(), Some(RevisionLevel::First));
        assert_eq!(
            revisions.iter().map(|r| r.level.number()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_mark_complete() {
        let mut revisions = Revisions::new();
        let at = Utc::now();
        revisions.mark_complete(RevisionLevel::Second, at);

        assert_eq!(revisions.flags(), [false, true, false]);
        assert_eq!(revisions.get(RevisionLevel::Second).completed_at, Some(at));
        assert_eq!(revisions.completed_count(), 1);
        assert_eq!(revisions.next_due(), Some(RevisionLevel::First));
    }

    #[test]
    fn test_canonical_serialization() {
        let mut revisions = Revisions::new();
        revisions.mark_complete(
            RevisionLevel::First,
            "2026-03-01T09:00:00Z".parse().unwrap(),
        );

        let json = serde_json::to_string(&revisions).unwrap();
        assert_eq!(
            json,
            r#"[{"level":1,"completed":true,"completedAt":"2026-03-01T09:00:00Z"},{"level":2,"completed":false},{"level":3,"completed":false}]"#
        );

        let back: Revisions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, revisions);
    }

    #[test]
    fn test_migrates_flag_record() {
        let revisions: Revisions =
            serde_json::from_str(r#"{"r1":true,"r2":false,"r3":true,"r1Date":"2026-02-01"}"#)
                .unwrap();

        assert_eq!(revisions.flags(), [true, false, true]);
        assert_eq!(
            revisions.get(RevisionLevel::First).completed_at,
            Some("2026-02-01T00:00:00Z".parse().unwrap())
        );
        assert!(revisions.get(RevisionLevel::Third).completed_at.is_none());
    }

    #[test]
    fn test_migrates_unlabelled_array() {
        let revisions: Revisions = serde_json::from_str(
            r#"[{"completed":true,"date":"2026-02-01T08:30:00Z"},{"completed":true,"date":1767225600000},{"completed":false,"date":null}]"#,
        )
        .unwrap();

        assert_eq!(revisions.flags(), [true, true, false]);
        assert!(revisions.get(RevisionLevel::Second).completed_at.is_some());
    }

    #[test]
    fn test_short_and_unordered_arrays() {
        let revisions: Revisions =
            serde_json::from_str(r#"[{"level":3,"completed":true}]"#).unwrap();
        assert_eq!(revisions.flags(), [false, false, true]);

        let revisions: Revisions = serde_json::from_str(r#"[]"#).unwrap();
        assert_eq!(revisions, Revisions::new());

        // Entries past the third pass are dropped
        let revisions: Revisions = serde_json::from_str(
            r#"[{"completed":true},{"completed":true},{"completed":true},{"completed":true}]"#,
        )
        .unwrap();
        assert_eq!(revisions.completed_count(), 3);
    }
}
