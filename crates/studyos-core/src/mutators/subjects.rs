//! Subject mutators

use chrono::Utc;
use tracing::info;

use super::{required, subject_mut, unique_id, validate_mastery};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    default_color, NewSubject, NewTopic, Subject, SubjectStatus, SubjectUpdate, Topic,
};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// All subjects, in insertion order
    pub fn subjects(&self) -> Vec<Subject> {
        self.read(DocumentKey::Subjects)
    }

    /// Subjects with the given status
    pub fn subjects_by_status(&self, status: SubjectStatus) -> Vec<Subject> {
        self.subjects()
            .into_iter()
            .filter(|s| s.status == status)
            .collect()
    }

    /// A single subject
    pub fn get_subject(&self, id: &str) -> CoreResult<Subject> {
        self.subjects()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("Subject", id))
    }

    /// Create a subject
    ///
    /// The exam date is required and may not be before today. Without an
    /// explicit status the subject starts `upcoming` when its start date is
    /// in the future, `active` otherwise.
    pub fn add_subject(&self, new: NewSubject) -> CoreResult<Subject> {
        let today = self.today();
        let name = required(&new.name, "Subject name is required")?;
        let exam_date = new
            .exam_date
            .ok_or_else(|| CoreError::validation("Exam date is required"))?;
        if exam_date < today {
            return Err(CoreError::validation("Exam date must be in the future"));
        }

        let start_date = new.start_date.unwrap_or(today);
        if start_date > exam_date {
            return Err(CoreError::validation(
                "Start date must be on or before the exam date",
            ));
        }
        if new.target_score.is_some_and(|t| t > 100) {
            return Err(CoreError::validation(
                "Target score must be between 0 and 100",
            ));
        }
        if new.total_hours < 0.0 {
            return Err(CoreError::validation("Total hours cannot be negative"));
        }

        let status = match new.status {
            Some(SubjectStatus::Archived) => {
                return Err(CoreError::validation("A new subject cannot be archived"))
            }
            Some(status) => status,
            None if start_date > today => SubjectStatus::Upcoming,
            None => SubjectStatus::Active,
        };

        let now = Utc::now();
        let topics = build_topics(new.topics, now)?;

        let subject = self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let id = unique_id(&name, "subject", now, |id| subjects.iter().any(|s| s.id == id));
            let subject = Subject {
                id,
                name,
                color: new.color.unwrap_or_else(default_color),
                status,
                start_date,
                exam_date,
                completed_date: None,
                archived_date: None,
                target_score: new.target_score.unwrap_or(0),
                actual_score: None,
                total_hours: new.total_hours,
                hours_completed: 0.0,
                subject_type: new.subject_type,
                semester: new.semester,
                importance: new.importance,
                topics,
                created_at: now,
                updated_at: now,
            };
            subjects.push(subject.clone());
            Ok(subject)
        })?;

        info!("Added subject {}", subject.id);
        Ok(subject)
    }

    /// Apply a partial update to a subject
    pub fn update_subject(&self, id: &str, update: SubjectUpdate) -> CoreResult<Subject> {
        let name = update
            .name
            .as_deref()
            .map(|n| required(n, "Subject name is required"))
            .transpose()?;
        for score in [update.target_score, update.actual_score].into_iter().flatten() {
            if score > 100 {
                return Err(CoreError::validation("Scores must be between 0 and 100"));
            }
        }
        for hours in [update.total_hours, update.hours_completed].into_iter().flatten() {
            if hours < 0.0 {
                return Err(CoreError::validation("Hours cannot be negative"));
            }
        }

        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, id)?;

            let start_date = update.start_date.unwrap_or(subject.start_date);
            let exam_date = update.exam_date.unwrap_or(subject.exam_date);
            if start_date > exam_date {
                return Err(CoreError::validation(
                    "Start date must be on or before the exam date",
                ));
            }

            if let Some(name) = name {
                subject.name = name;
            }
            if let Some(color) = update.color {
                subject.color = color;
            }
            subject.start_date = start_date;
            subject.exam_date = exam_date;
            if let Some(target) = update.target_score {
                subject.target_score = target;
            }
            if update.actual_score.is_some() {
                subject.actual_score = update.actual_score;
            }
            if let Some(hours) = update.total_hours {
                subject.total_hours = hours;
            }
            if let Some(hours) = update.hours_completed {
                subject.hours_completed = hours;
            }
            if let Some(subject_type) = update.subject_type {
                subject.subject_type = subject_type;
            }
            if let Some(semester) = update.semester {
                subject.semester = semester;
            }
            if let Some(importance) = update.importance {
                subject.importance = importance;
            }
            subject.updated_at = Utc::now();
            Ok(subject.clone())
        })
    }

    /// Remove a subject and its topics
    pub fn delete_subject(&self, id: &str) -> CoreResult<Subject> {
        let removed = self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let position = subjects
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| CoreError::not_found("Subject", id))?;
            Ok(subjects.remove(position))
        })?;

        info!("Deleted subject {}", id);
        Ok(removed)
    }

    /// Move a subject through its lifecycle
    ///
    /// Only `upcoming → active`, `active → archived` and `archived → active`
    /// are allowed. Archiving stamps `archivedDate` and `completedDate`;
    /// restoring clears them. Topics are never touched.
    pub fn change_subject_status(&self, id: &str, status: SubjectStatus) -> CoreResult<Subject> {
        let today = self.today();
        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, id)?;
            if !subject.status.can_transition_to(status) {
                return Err(CoreError::validation(format!(
                    "Cannot change status from {} to {}",
                    subject.status, status
                )));
            }

            match status {
                SubjectStatus::Archived => {
                    subject.archived_date = Some(today);
                    subject.completed_date = Some(today);
                }
                SubjectStatus::Active if subject.status == SubjectStatus::Archived => {
                    subject.archived_date = None;
                    subject.completed_date = None;
                }
                _ => {}
            }

            subject.status = status;
            subject.updated_at = Utc::now();
            Ok(subject.clone())
        })
    }
}

/// Turn topic inputs into topics with unique ids
fn build_topics(inputs: Vec<NewTopic>, now: chrono::DateTime<Utc>) -> CoreResult<Vec<Topic>> {
    let mut topics: Vec<Topic> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let topic = new_topic(input, now, |id| topics.iter().any(|t| t.id == id))?;
        topics.push(topic);
    }
    Ok(topics)
}

/// Validate a topic input and build the topic
pub(crate) fn new_topic(
    input: NewTopic,
    now: chrono::DateTime<Utc>,
    taken: impl Fn(&str) -> bool,
) -> CoreResult<Topic> {
    let name = required(&input.name, "Topic name is required")?;
    let mastery = input.mastery.map(validate_mastery).transpose()?.unwrap_or(0);

    let mut topic = Topic::new(unique_id(&name, "topic", now, taken), name);
    topic.mastery = mastery;
    topic.priority = input.priority;
    topic.notes = input.notes;
    topic.last_updated = Some(now);
    Ok(topic)
}
