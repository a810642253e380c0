//! Subjects and their topics

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::revision::Revisions;
use crate::error::CoreError;

/// Mastery at or above this counts a topic as completed
pub const MASTERY_COMPLETE: u8 = 80;

/// Lifecycle of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    Upcoming,
    Active,
    Archived,
}

impl SubjectStatus {
    /// Allowed transitions: upcoming → active, active → archived,
    /// archived → active (restore)
    pub fn can_transition_to(self, next: SubjectStatus) -> bool {
        matches!(
            (self, next),
            (SubjectStatus::Upcoming, SubjectStatus::Active)
                | (SubjectStatus::Active, SubjectStatus::Archived)
                | (SubjectStatus::Archived, SubjectStatus::Active)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStatus::Upcoming => "upcoming",
            SubjectStatus::Active => "active",
            SubjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(SubjectStatus::Upcoming),
            "active" => Ok(SubjectStatus::Active),
            "archived" => Ok(SubjectStatus::Archived),
            _ => Err(CoreError::validation(format!(
                "Invalid status: {}. Expected upcoming, active or archived",
                s
            ))),
        }
    }
}

/// Priority of a topic, or importance of a subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(CoreError::validation(format!(
                "Invalid priority: {}. Expected low, medium or high",
                s
            ))),
        }
    }
}

/// A topic within a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// 0–100
    #[serde(default)]
    pub mastery: u8,
    #[serde(default)]
    pub priority: Priority,
    /// Hours studied
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub revisions: Revisions,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_revision: Option<DateTime<Utc>>,
}

impl Topic {
    /// Create a topic with no progress
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mastery: 0,
            priority: Priority::default(),
            time_spent: 0.0,
            revisions: Revisions::default(),
            notes: String::new(),
            last_studied: None,
            last_updated: None,
            last_revision: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.mastery >= MASTERY_COMPLETE
    }

    pub fn is_not_started(&self) -> bool {
        self.mastery == 0
    }
}

/// A study subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub status: SubjectStatus,
    pub start_date: NaiveDate,
    pub exam_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_score: Option<u32>,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub hours_completed: f64,
    #[serde(rename = "type", default)]
    pub subject_type: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub importance: Priority,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn topic_mut(&mut self, topic_id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == topic_id)
    }

    /// Mean topic mastery, 0 without topics
    pub fn progress(&self) -> f64 {
        if self.topics.is_empty() {
            return 0.0;
        }
        let total: f64 = self.topics.iter().map(|t| f64::from(t.mastery)).sum();
        total / self.topics.len() as f64
    }

    pub fn is_active(&self) -> bool {
        self.status == SubjectStatus::Active
    }
}

/// Input for creating a subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSubject {
    pub name: String,
    pub color: Option<String>,
    pub status: Option<SubjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub exam_date: Option<NaiveDate>,
    pub target_score: Option<u32>,
    pub total_hours: f64,
    #[serde(rename = "type")]
    pub subject_type: String,
    pub semester: String,
    pub importance: Priority,
    pub topics: Vec<NewTopic>,
}

impl NewSubject {
    pub fn new(name: impl Into<String>, exam_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            exam_date: Some(exam_date),
            ..Self::default()
        }
    }
}

/// Partial update of a subject; `None` fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub exam_date: Option<NaiveDate>,
    pub target_score: Option<u32>,
    pub actual_score: Option<u32>,
    pub total_hours: Option<f64>,
    pub hours_completed: Option<f64>,
    #[serde(rename = "type")]
    pub subject_type: Option<String>,
    pub semester: Option<String>,
    pub importance: Option<Priority>,
}

/// Input for creating a topic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTopic {
    pub name: String,
    pub priority: Priority,
    pub mastery: Option<i64>,
    pub notes: String,
}

impl NewTopic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_mastery(mut self, mastery: i64) -> Self {
        self.mastery = Some(mastery);
        self
    }
}

pub fn default_color() -> String {
    "#6366f1".to_string()
}

/// Lowercase ASCII slug of `name`, e.g. "Linear Algebra II" → "linear-algebra-ii"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
