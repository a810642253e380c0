//! Schedule command handlers

use anyhow::Result;
use chrono::NaiveDate;

use studyos_core::{NewScheduleBlock, Store};

use crate::output::Output;

pub fn add(
    store: &Store,
    date: NaiveDate,
    time: String,
    activity: String,
    duration: u32,
    kind: String,
    output: &Output,
) -> Result<()> {
    let input = NewScheduleBlock {
        time,
        activity,
        block_type: kind,
        duration,
    };
    let block = store.add_schedule_block(date, input)?;

    output.success(&format!(
        "Planned {} at {} on {}",
        block.activity,
        block.time.format("%H:%M"),
        date
    ));
    if output.is_quiet() {
        println!("{}", block.id);
    }
    Ok(())
}

pub fn list(store: &Store, date: NaiveDate, output: &Output) -> Result<()> {
    let blocks = store.schedule_for(date);
    output.print_schedule(date, &blocks)
}

/// Resolve a full block id from a unique prefix
fn resolve_block_id(store: &Store, date: NaiveDate, prefix: &str) -> Result<String> {
    let matches: Vec<String> = store
        .schedule_for(date)
        .into_iter()
        .map(|b| b.id)
        .filter(|id| id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Ok(prefix.to_string()),
        _ => anyhow::bail!("Ambiguous block ID '{}', matches {} blocks", prefix, matches.len()),
    }
}

pub fn complete(store: &Store, date: NaiveDate, id: &str, output: &Output) -> Result<()> {
    let id = resolve_block_id(store, date, id)?;
    let block = store.complete_schedule_block(date, &id)?;
    output.success(&format!("Completed: {}", block.activity));
    Ok(())
}

pub fn delete(store: &Store, date: NaiveDate, id: &str, output: &Output) -> Result<()> {
    let id = resolve_block_id(store, date, id)?;
    let block = store.delete_schedule_block(date, &id)?;
    output.success(&format!("Removed: {}", block.activity));
    Ok(())
}
