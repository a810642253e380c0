//! Config command handlers

use anyhow::{Context, Result};

use studyos_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "quota_bytes": config.quota_bytes,
                    "refresh_interval_ms": config.refresh_interval_ms,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  quota_bytes:         {}",
                match config.quota() {
                    Some(quota) => quota.to_string(),
                    None => "(unlimited)".to_string(),
                }
            );
            println!(
                "  refresh_interval_ms: {}",
                match config.refresh_interval_ms {
                    0 => "(polling off)".to_string(),
                    ms => ms.to_string(),
                }
            );
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(stderr)".to_string())
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    config.set_value(&key, &value)?;
    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
