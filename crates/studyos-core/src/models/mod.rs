//! Data models for studyos
//!
//! Each persisted document maps to one of these types:
//!
//! - subjects: `Vec<Subject>` (topics and revisions nested inside)
//! - schedule: [`Schedule`]
//! - journal: [`Journal`]
//! - habits: [`HabitLog`]
//! - user: [`UserProfile`]
//! - savedContent: [`SavedContent`]
//!
//! All JSON uses camelCase field names.

mod content;
mod revision;
mod schedule;
mod subject;
mod tracking;

pub use content::{Platform, SavedContent, SavedContentItem};
pub use revision::{RevisionLevel, RevisionRecord, Revisions};
pub use schedule::{parse_time, NewScheduleBlock, Schedule, ScheduleBlock};
pub use subject::{
    default_color, slugify, NewSubject, NewTopic, Priority, Subject, SubjectStatus,
    SubjectUpdate, Topic, MASTERY_COMPLETE,
};
pub use tracking::{HabitCheck, HabitLog, Journal, JournalEntry, ProfileUpdate, UserProfile};
