//! Subject command handlers

use anyhow::{Context, Result};
use chrono::NaiveDate;

use studyos_core::{NewSubject, NewTopic, Priority, Store, SubjectStatus, SubjectUpdate};

use crate::output::Output;

/// Fields accepted by `subject add`
pub struct AddArgs {
    pub name: String,
    pub exam: NaiveDate,
    pub start: Option<NaiveDate>,
    pub status: Option<SubjectStatus>,
    pub target: Option<u32>,
    pub hours: f64,
    pub color: Option<String>,
    pub kind: String,
    pub semester: String,
    pub importance: Priority,
    pub topics: Vec<String>,
}

/// Create a subject
pub fn add(store: &Store, args: AddArgs, output: &Output) -> Result<()> {
    let new = NewSubject {
        name: args.name,
        color: args.color,
        status: args.status,
        start_date: args.start,
        exam_date: Some(args.exam),
        target_score: args.target,
        total_hours: args.hours,
        subject_type: args.kind,
        semester: args.semester,
        importance: args.importance,
        topics: args.topics.into_iter().map(NewTopic::new).collect(),
    };

    let subject = store.add_subject(new).context("Failed to add subject")?;

    output.success(&format!("Added subject: {}", subject.id));
    output.print_subject(&subject)
}

/// List subjects, optionally by status
pub fn list(store: &Store, status: Option<SubjectStatus>, output: &Output) -> Result<()> {
    let subjects = match status {
        Some(status) => store.subjects_by_status(status),
        None => store.subjects(),
    };
    output.print_subjects(&subjects)
}

pub fn show(store: &Store, id: &str, output: &Output) -> Result<()> {
    let subject = store.get_subject(id)?;
    output.print_subject(&subject)
}

pub fn update(store: &Store, id: &str, update: SubjectUpdate, output: &Output) -> Result<()> {
    let subject = store
        .update_subject(id, update)
        .context("Failed to update subject")?;

    output.success("Subject updated");
    output.print_subject(&subject)
}

/// Move a subject to another lifecycle status
pub fn set_status(store: &Store, id: &str, status: SubjectStatus, output: &Output) -> Result<()> {
    let subject = store.change_subject_status(id, status)?;
    output.success(&format!("{} is now {}", subject.name, subject.status));
    Ok(())
}

pub fn delete(store: &Store, id: &str, output: &Output) -> Result<()> {
    let subject = store.delete_subject(id).context("Failed to delete subject")?;
    output.success(&format!(
        "Deleted subject: {} ({} topic(s))",
        subject.name,
        subject.topics.len()
    ));
    Ok(())
}
