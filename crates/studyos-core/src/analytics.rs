//! Progress analytics
//!
//! Pure functions over a snapshot of the documents, plus store-level
//! wrappers that load the snapshot and degrade to zeroed aggregates when the
//! documents cannot be read.
//!
//! Per-subject progress is the mean topic mastery. Overall progress weights
//! every active subject equally, however many topics it has.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::models::{HabitLog, Priority, Subject, SubjectStatus, UserProfile, MASTERY_COMPLETE};
use crate::storage::DocumentKey;
use crate::store::Store;

/// Critical topics reported at most
pub const MAX_CRITICAL_TOPICS: usize = 10;

/// Upcoming exams reported at most
pub const MAX_UPCOMING_EXAMS: usize = 5;

/// Estimated hours left per topic below the completion threshold
pub const HOURS_PER_INCOMPLETE_TOPIC: f64 = 2.0;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Aggregate progress across active subjects
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub total_subjects: usize,
    /// Rounded mean of per-subject progress, 0–100
    pub average_progress: u32,
    pub upcoming_exams: Vec<UpcomingExam>,
    pub critical_topics: Vec<CriticalTopic>,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingExam {
    pub subject_id: String,
    pub subject_name: String,
    pub exam_date: NaiveDate,
    /// Negative once the exam has passed
    pub days_until: i64,
}

/// A high-priority topic still below the completion threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalTopic {
    pub subject_id: String,
    pub subject_name: String,
    pub topic_id: String,
    pub topic_name: String,
    pub mastery: u8,
}

/// Breakdown of a single subject
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetrics {
    pub subject_id: String,
    pub total_topics: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub time_spent: f64,
    pub remaining_hours: f64,
    pub progress: u32,
    pub revisions_completed: usize,
    pub days_until_exam: i64,
}

/// Whole days from `now` until the start of `exam_date` (UTC), rounded up
pub fn days_until(exam_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let exam = exam_date.and_time(chrono::NaiveTime::MIN).and_utc();
    let millis = (exam - now).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling
    // for negative values
    if millis > 0 {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    } else {
        millis / MILLIS_PER_DAY
    }
}

/// Progress over every active subject
pub fn calculate_overall_progress(
    subjects: &[Subject],
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> OverallProgress {
    let active: Vec<&Subject> = subjects.iter().filter(|s| s.is_active()).collect();
    if active.is_empty() {
        return OverallProgress::default();
    }

    let total: f64 = active.iter().map(|s| s.progress()).sum();
    let average_progress = (total / active.len() as f64).round() as u32;

    let critical_topics = active
        .iter()
        .flat_map(|s| {
            s.topics
                .iter()
                .filter(|t| t.priority == Priority::High && t.mastery < MASTERY_COMPLETE)
                .map(move |t| CriticalTopic {
                    subject_id: s.id.clone(),
                    subject_name: s.name.clone(),
                    topic_id: t.id.clone(),
                    topic_name: t.name.clone(),
                    mastery: t.mastery,
                })
        })
        .take(MAX_CRITICAL_TOPICS)
        .collect();

    let mut upcoming_exams: Vec<UpcomingExam> = active
        .iter()
        .map(|s| UpcomingExam {
            subject_id: s.id.clone(),
            subject_name: s.name.clone(),
            exam_date: s.exam_date,
            days_until: days_until(s.exam_date, now),
        })
        .collect();
    upcoming_exams.sort_by_key(|e| e.days_until);
    upcoming_exams.truncate(MAX_UPCOMING_EXAMS);

    OverallProgress {
        total_subjects: active.len(),
        average_progress,
        upcoming_exams,
        critical_topics,
        streak: profile.current_streak,
    }
}

/// Metrics for the subject with `subject_id`
pub fn calculate_subject_metrics(
    subjects: &[Subject],
    subject_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<SubjectMetrics> {
    let subject = subjects
        .iter()
        .find(|s| s.id == subject_id)
        .ok_or_else(|| CoreError::not_found("Subject", subject_id))?;

    let completed = subject.topics.iter().filter(|t| t.is_completed()).count();
    let not_started = subject.topics.iter().filter(|t| t.is_not_started()).count();
    let in_progress = subject.topics.len() - completed - not_started;

    Ok(SubjectMetrics {
        subject_id: subject.id.clone(),
        total_topics: subject.topics.len(),
        completed,
        in_progress,
        not_started,
        time_spent: subject.topics.iter().map(|t| t.time_spent).sum(),
        remaining_hours: (subject.topics.len() - completed) as f64 * HOURS_PER_INCOMPLETE_TOPIC,
        progress: subject.progress().round() as u32,
        revisions_completed: subject
            .topics
            .iter()
            .map(|t| t.revisions.completed_count())
            .sum(),
        days_until_exam: days_until(subject.exam_date, now),
    })
}

/// Consecutive days `habit` was completed, ending today
///
/// A day that is not yet checked off does not break the streak until it is
/// over, so counting starts from yesterday in that case.
pub fn habit_streak(habits: &HabitLog, habit: &str, today: NaiveDate) -> u32 {
    let done = |day: NaiveDate| {
        habits
            .get(&day)
            .and_then(|checks| checks.get(habit))
            .is_some_and(|check| check.completed)
    };

    let mut day = if done(today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while done(day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Count `today` as a study day in `profile`
pub fn advance_streak(profile: &mut UserProfile, today: NaiveDate) {
    match profile.last_study_date {
        Some(last) if last == today => return,
        Some(last) if last + Duration::days(1) == today => profile.current_streak += 1,
        _ => profile.current_streak = 1,
    }
    profile.longest_streak = profile.longest_streak.max(profile.current_streak);
    profile.last_study_date = Some(today);
}

impl Store {
    /// Overall progress, zeroed when the documents cannot be read
    pub fn overall_progress(&self) -> OverallProgress {
        let snapshot = self
            .read_strict::<Vec<Subject>>(DocumentKey::Subjects)
            .and_then(|subjects| {
                let profile = self.read_strict::<UserProfile>(DocumentKey::User)?;
                Ok((subjects, profile))
            });

        match snapshot {
            Ok((subjects, profile)) => calculate_overall_progress(&subjects, &profile, Utc::now()),
            Err(e) => {
                warn!("Failed to compute overall progress: {}", e);
                OverallProgress::default()
            }
        }
    }

    /// Metrics for one subject
    ///
    /// An unknown id is still an error; unreadable documents yield zeroed
    /// metrics.
    pub fn subject_metrics(&self, subject_id: &str) -> CoreResult<SubjectMetrics> {
        match self.read_strict::<Vec<Subject>>(DocumentKey::Subjects) {
            Ok(subjects) => calculate_subject_metrics(&subjects, subject_id, Utc::now()),
            Err(e) => {
                warn!("Failed to compute metrics for {}: {}", subject_id, e);
                Ok(SubjectMetrics {
                    subject_id: subject_id.to_string(),
                    ..SubjectMetrics::default()
                })
            }
        }
    }

    /// Subjects grouped by lifecycle status, in `upcoming, active, archived` order
    pub fn status_counts(&self) -> [(SubjectStatus, usize); 3] {
        let subjects = self.subjects();
        [SubjectStatus::Upcoming, SubjectStatus::Active, SubjectStatus::Archived]
            .map(|status| (status, subjects.iter().filter(|s| s.status == status).count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitCheck, Topic};

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn topic(id: &str, mastery: u8, priority: Priority) -> Topic {
        let mut topic = Topic::new(id, id.to_uppercase());
        topic.mastery = mastery;
        topic.priority = priority;
        topic
    }

    fn subject(id: &str, exam: &str, masteries: &[u8]) -> Subject {
        let mut subject: Subject = serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id.to_uppercase(),
            "status": "active",
            "startDate": "2026-01-01",
            "examDate": exam,
        }))
        .unwrap();
        subject.topics = masteries
            .iter()
            .enumerate()
            .map(|(i, m)| topic(&format!("{}-t{}", id, i), *m, Priority::Medium))
            .collect();
        subject
    }

    #[test]
    fn test_no_active_subjects_is_zeroed() {
        let mut archived = subject("a", "2026-04-01", &[50]);
        archived.status = SubjectStatus::Archived;
        let profile = UserProfile {
            current_streak: 3,
            ..UserProfile::default()
        };

        let progress = calculate_overall_progress(&[archived], &profile, now());
        assert_eq!(progress, OverallProgress::default());
        assert_eq!(progress.streak, 0);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalSubjects": 0, "averageProgress": 0,
                "upcomingExams": [], "criticalTopics": [], "streak": 0
            })
        );
    }

    #[test]
    fn test_average_weights_subjects_equally() {
        let profile = UserProfile::default();

        let even = [subject("a", "2026-04-01", &[100, 0]), subject("b", "2026-04-01", &[50])];
        assert_eq!(calculate_overall_progress(&even, &profile, now()).average_progress, 50);

        // Topic weighting would give round(200 / 3) = 67
        let skewed = [subject("a", "2026-04-01", &[100, 100]), subject("b", "2026-04-01", &[0])];
        assert_eq!(calculate_overall_progress(&skewed, &profile, now()).average_progress, 50);
    }

    #[test]
    fn test_subject_without_topics_counts_as_zero() {
        let subjects = [subject("a", "2026-04-01", &[]), subject("b", "2026-04-01", &[90])];
        let progress = calculate_overall_progress(&subjects, &UserProfile::default(), now());
        assert_eq!(progress.total_subjects, 2);
        assert_eq!(progress.average_progress, 45);
    }

    #[test]
    fn test_critical_topics_capped_in_iteration_order() {
        let mut a = subject("a", "2026-04-01", &[]);
        a.topics = (0..8)
            .map(|i| topic(&format!("a{}", i), 10, Priority::High))
            .collect();
        a.topics.push(topic("done", 80, Priority::High));
        a.topics.push(topic("low", 0, Priority::Low));
        let mut b = subject("b", "2026-04-01", &[]);
        b.topics = (0..5)
            .map(|i| topic(&format!("b{}", i), 79, Priority::High))
            .collect();

        let progress = calculate_overall_progress(&[a, b], &UserProfile::default(), now());
        let ids: Vec<_> = progress
            .critical_topics
            .iter()
            .map(|t| t.topic_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "b0", "b1"]
        );
    }

    #[test]
    fn test_upcoming_exams_sorted_truncated_and_include_past() {
        let subjects: Vec<Subject> = [
            ("late", "2026-06-01"),
            ("past", "2026-02-20"),
            ("soon", "2026-03-02"),
            ("mid", "2026-04-01"),
            ("later", "2026-05-01"),
            ("latest", "2026-07-01"),
        ]
        .iter()
        .map(|(id, exam)| subject(id, exam, &[]))
        .collect();

        let progress = calculate_overall_progress(&subjects, &UserProfile::default(), now());
        let ids: Vec<_> = progress
            .upcoming_exams
            .iter()
            .map(|e| e.subject_id.as_str())
            .collect();
        assert_eq!(ids, vec!["past", "soon", "mid", "later", "late"]);
        assert!(progress.upcoming_exams[0].days_until < 0);
    }

    #[test]
    fn test_days_until_rounds_up() {
        // Noon on the 1st: the 2nd is half a day away
        assert_eq!(days_until(date("2026-03-02"), now()), 1);
        assert_eq!(days_until(date("2026-03-01"), now()), 0);
        assert_eq!(days_until(date("2026-02-28"), now()), -1);
        assert_eq!(days_until(date("2026-03-11"), now()), 10);

        let midnight: DateTime<Utc> = "2026-03-01T00:00:00Z".parse().unwrap();
        assert_eq!(days_until(date("2026-03-01"), midnight), 0);
        assert_eq!(days_until(date("2026-03-02"), midnight), 1);
    }

    #[test]
    fn test_subject_metrics() {
        let mut s = subject("a", "2026-03-11", &[100, 80, 40, 0, 0]);
        s.topics[0].time_spent = 3.5;
        s.topics[2].time_spent = 1.0;
        s.topics[1]
            .revisions
            .mark_complete(crate::models::RevisionLevel::First, now());

        let metrics = calculate_subject_metrics(&[s], "a", now()).unwrap();
        assert_eq!(metrics.total_topics, 5);
        assert_eq!(metrics.completed, 2);
        assert_eq!(metrics.in_progress, 1);
        assert_eq!(metrics.not_started, 2);
        assert_eq!(metrics.time_spent, 4.5);
        assert_eq!(metrics.remaining_hours, 6.0);
        assert_eq!(metrics.progress, 44);
        assert_eq!(metrics.revisions_completed, 1);
        assert_eq!(metrics.days_until_exam, 10);
    }

    #[test]
    fn test_subject_metrics_unknown_subject() {
        let err = calculate_subject_metrics(&[], "ghost", now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_advance_streak() {
        let mut profile = UserProfile::default();

        advance_streak(&mut profile, date("2026-03-01"));
        assert_eq!((profile.current_streak, profile.longest_streak), (1, 1));

        advance_streak(&mut profile, date("2026-03-01"));
        assert_eq!((profile.current_streak, profile.longest_streak), (1, 1));

        advance_streak(&mut profile, date("2026-03-02"));
        advance_streak(&mut profile, date("2026-03-03"));
        assert_eq!((profile.current_streak, profile.longest_streak), (3, 3));

        advance_streak(&mut profile, date("2026-03-05"));
        assert_eq!((profile.current_streak, profile.longest_streak), (1, 3));
        assert_eq!(profile.last_study_date, Some(date("2026-03-05")));
    }

    #[test]
    fn test_habit_streak() {
        let mut habits = HabitLog::new();
        let check = |completed| HabitCheck {
            completed,
            timestamp: now(),
        };
        for (day, completed) in [
            ("2026-02-25", true),
            ("2026-02-26", false),
            ("2026-02-27", true),
            ("2026-02-28", true),
        ] {
            habits
                .entry(date(day))
                .or_default()
                .insert("Read".to_string(), check(completed));
        }

        // Today not yet logged
        assert_eq!(habit_streak(&habits, "Read", date("2026-03-01")), 2);

        habits
            .entry(date("2026-03-01"))
            .or_default()
            .insert("Read".to_string(), check(true));
        assert_eq!(habit_streak(&habits, "Read", date("2026-03-01")), 3);

        assert_eq!(habit_streak(&habits, "Read", date("2026-03-03")), 0);
        assert_eq!(habit_streak(&habits, "Exercise", date("2026-03-01")), 0);
    }

    #[test]
    fn test_store_wrappers_degrade_on_corrupt_documents() {
        let store = Store::in_memory();
        store
            .documents()
            .save_raw(DocumentKey::Subjects, "[{\"id\":")
            .unwrap();

        assert_eq!(store.overall_progress(), OverallProgress::default());
        let metrics = store.subject_metrics("physics").unwrap();
        assert_eq!(metrics.subject_id, "physics");
        assert_eq!(metrics.total_topics, 0);
    }
}
