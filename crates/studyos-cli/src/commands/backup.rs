//! Backup command handlers

use std::path::Path;

use anyhow::{Context, Result};

use studyos_core::Store;

use crate::output::Output;

/// Write every document to a backup file, or stdout for `-`
pub fn export(store: &Store, path: &Path, output: &Output) -> Result<()> {
    let text = store.export_to_string().context("Failed to export data")?;

    if path == Path::new("-") {
        println!("{}", text);
        return Ok(());
    }

    std::fs::write(path, &text)
        .with_context(|| format!("Failed to write backup to {}", path.display()))?;
    output.success(&format!("Exported backup to {}", path.display()));
    Ok(())
}

/// Restore documents from a backup file
pub fn import(store: &Store, path: &Path, output: &Output) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let restored = store
        .import_from_str(&text)
        .context("Failed to import backup")?;

    if output.is_json() {
        let keys: Vec<String> = restored.iter().map(|k| k.storage_key()).collect();
        return output.json(&serde_json::json!({"success": true, "restored": keys}));
    }
    output.success(&format!("Restored {} document(s)", restored.len()));
    Ok(())
}
