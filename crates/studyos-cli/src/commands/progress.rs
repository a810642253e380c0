//! Progress, metrics and watch command handlers

use anyhow::Result;
use tracing::debug;

use studyos_core::{ReadModel, Store};

use crate::output::Output;

pub fn overall(store: &Store, output: &Output) -> Result<()> {
    output.print_progress(&store.overall_progress())
}

pub fn metrics(store: &Store, subject_id: &str, output: &Output) -> Result<()> {
    let metrics = store.subject_metrics(subject_id)?;
    output.print_metrics(&metrics)
}

/// Print overall progress now and again whenever it changes, until Ctrl-C
pub async fn watch(store: Store, output: &Output) -> Result<()> {
    if store.config().refresh_interval().is_none() {
        output.message("Polling is disabled (refresh_interval_ms = 0); only local writes are seen.");
    }

    let model = ReadModel::overall_progress(store);
    let mut updates = model.subscribe();
    output.print_progress(&model.data())?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(error) = snapshot.error {
                    debug!("Progress reload failed: {}", error);
                    continue;
                }
                if !output.is_json() && !output.is_quiet() {
                    println!();
                }
                output.print_progress(&snapshot.data)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
