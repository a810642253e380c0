//! Topic command handlers

use anyhow::{Context, Result};

use studyos_core::{NewTopic, Priority, Store};

use crate::output::Output;

pub fn add(
    store: &Store,
    subject_id: &str,
    name: String,
    priority: Priority,
    mastery: Option<i64>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let input = NewTopic {
        name,
        priority,
        mastery,
        notes: notes.unwrap_or_default(),
    };
    let topic = store
        .add_topic(subject_id, input)
        .context("Failed to add topic")?;

    output.success(&format!("Added topic: {}", topic.id));
    output.print_topic(&topic)
}

pub fn mastery(store: &Store, subject_id: &str, topic_id: &str, mastery: i64, output: &Output) -> Result<()> {
    let topic = store.update_topic_mastery(subject_id, topic_id, mastery)?;
    output.success(&format!("{} mastery set to {}%", topic.name, topic.mastery));
    Ok(())
}

/// Mark a revision pass complete
pub fn revise(store: &Store, subject_id: &str, topic_id: &str, level: &str, output: &Output) -> Result<()> {
    let topic = store.mark_revision_complete(subject_id, topic_id, level)?;
    output.success(&format!(
        "{}: {}/3 revisions done",
        topic.name,
        topic.revisions.completed_count()
    ));
    output.print_topic(&topic)
}

/// Log hours studied
pub fn study(store: &Store, subject_id: &str, topic_id: &str, hours: f64, output: &Output) -> Result<()> {
    let topic = store.log_study_time(subject_id, topic_id, hours)?;
    output.success(&format!(
        "Logged {:.1} h on {} ({:.1} h total)",
        hours, topic.name, topic.time_spent
    ));
    Ok(())
}

pub fn notes(store: &Store, subject_id: &str, topic_id: &str, notes: &str, output: &Output) -> Result<()> {
    let topic = store.update_topic_notes(subject_id, topic_id, notes)?;
    output.success(&format!("Notes updated for {}", topic.name));
    Ok(())
}

pub fn delete(store: &Store, subject_id: &str, topic_id: &str, output: &Output) -> Result<()> {
    let topic = store
        .delete_topic(subject_id, topic_id)
        .context("Failed to delete topic")?;
    output.success(&format!("Deleted topic: {}", topic.name));
    Ok(())
}
