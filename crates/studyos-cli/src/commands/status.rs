//! Status command handler

use anyhow::Result;

use studyos_core::storage::format_bytes;
use studyos_core::Store;

use crate::output::{Output, OutputFormat};

/// Show storage and content overview
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.storage_stats()?;
    let config = store.config();
    let statuses = store.status_counts();
    let content = store.saved_content();
    let profile = store.user_profile();

    match output.format {
        OutputFormat::Json => {
            let documents: serde_json::Map<_, _> = stats
                .documents
                .iter()
                .map(|(key, size)| (key.clone(), serde_json::json!(size)))
                .collect();
            let subjects: serde_json::Map<_, _> = statuses
                .iter()
                .map(|(status, count)| (status.to_string(), serde_json::json!(count)))
                .collect();
            output.json(&serde_json::json!({
                "data_dir": config.data_dir,
                "storage": {
                    "used_bytes": stats.used_bytes,
                    "quota_bytes": stats.quota_bytes,
                    "usage_ratio": stats.usage_ratio(),
                    "documents": documents
                },
                "counts": {
                    "subjects": subjects,
                    "saved_content": content.len(),
                    "unwatched": content.unwatched().count()
                },
                "streak": profile.current_streak
            }))?;
        }
        OutputFormat::Quiet => {
            println!("{}", stats.used_bytes);
        }
        OutputFormat::Human => {
            println!("studyos Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            match stats.quota_bytes {
                Some(quota) => println!(
                    "  Used:     {} of {} ({:.0}%)",
                    stats.used_human(),
                    format_bytes(quota),
                    stats.usage_ratio() * 100.0
                ),
                None => println!("  Used:     {}", stats.used_human()),
            }
            for (key, size) in &stats.documents {
                println!("    {:<24} {}", key, format_bytes(*size));
            }
            println!();
            println!("Subjects:");
            for (status, count) in statuses {
                println!("  {:<9} {}", format!("{}:", status), count);
            }
            println!();
            println!("Saved content: {} ({} unwatched)", content.len(), content.unwatched().count());
            println!("Study streak:  {} day(s)", profile.current_streak);

            if stats.usage_ratio() >= 0.9 {
                println!();
                println!("⚠ Storage is almost full. Export a backup with `studyos backup export <file>`.");
            }
        }
    }

    Ok(())
}
