//! Topic mutators

use chrono::Utc;

use super::subjects::new_topic;
use super::{subject_mut, validate_mastery};
use crate::error::{CoreError, CoreResult};
use crate::models::{RevisionLevel, Subject, Topic};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// Add a topic to a subject
    pub fn add_topic(&self, subject_id: &str, input: crate::models::NewTopic) -> CoreResult<Topic> {
        let now = Utc::now();
        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, subject_id)?;
            let topic = new_topic(input, now, |id| subject.topics.iter().any(|t| t.id == id))?;
            subject.topics.push(topic.clone());
            subject.updated_at = now;
            Ok(topic)
        })
    }

    /// Set a topic's mastery
    ///
    /// Values outside 0–100 are rejected, not clamped.
    pub fn update_topic_mastery(
        &self,
        subject_id: &str,
        topic_id: &str,
        mastery: i64,
    ) -> CoreResult<Topic> {
        let mastery = validate_mastery(mastery)?;
        self.with_topic(subject_id, topic_id, |topic, now| {
            topic.mastery = mastery;
            topic.last_updated = Some(now);
        })
    }

    /// Mark a revision pass (`r1`, `r2` or `r3`) as done
    pub fn mark_revision_complete(
        &self,
        subject_id: &str,
        topic_id: &str,
        level: &str,
    ) -> CoreResult<Topic> {
        let level: RevisionLevel = level.parse()?;
        self.with_topic(subject_id, topic_id, |topic, now| {
            topic.revisions.mark_complete(level, now);
            topic.last_revision = Some(now);
        })
    }

    /// Record study hours on a topic and its subject
    pub fn log_study_time(&self, subject_id: &str, topic_id: &str, hours: f64) -> CoreResult<Topic> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(CoreError::validation("Study time must be a positive number of hours"));
        }

        let now = Utc::now();
        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, subject_id)?;
            let topic = subject
                .topic_mut(topic_id)
                .ok_or_else(|| CoreError::not_found("Topic", topic_id))?;
            topic.time_spent += hours;
            topic.last_studied = Some(now);
            let topic = topic.clone();

            subject.hours_completed += hours;
            subject.updated_at = now;
            Ok(topic)
        })
    }

    /// Replace a topic's notes
    pub fn update_topic_notes(&self, subject_id: &str, topic_id: &str, notes: &str) -> CoreResult<Topic> {
        let notes = notes.to_string();
        self.with_topic(subject_id, topic_id, |topic, now| {
            topic.notes = notes;
            topic.last_updated = Some(now);
        })
    }

    /// Remove a topic from a subject
    pub fn delete_topic(&self, subject_id: &str, topic_id: &str) -> CoreResult<Topic> {
        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, subject_id)?;
            let position = subject
                .topics
                .iter()
                .position(|t| t.id == topic_id)
                .ok_or_else(|| CoreError::not_found("Topic", topic_id))?;
            subject.updated_at = Utc::now();
            Ok(subject.topics.remove(position))
        })
    }

    fn with_topic<F>(&self, subject_id: &str, topic_id: &str, change: F) -> CoreResult<Topic>
    where
        F: FnOnce(&mut Topic, chrono::DateTime<Utc>),
    {
        let now = Utc::now();
        self.transact(DocumentKey::Subjects, |subjects: &mut Vec<Subject>| {
            let subject = subject_mut(subjects, subject_id)?;
            let topic = subject
                .topic_mut(topic_id)
                .ok_or_else(|| CoreError::not_found("Topic", topic_id))?;
            change(topic, now);
            let topic = topic.clone();
            subject.updated_at = now;
            Ok(topic)
        })
    }
}
