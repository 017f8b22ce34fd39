use anyhow::{Context, Result};
use bookwise::config;
use colored::*;
use std::path::Path;

/// Print the effective config, or write it to `write` as a starting file
pub fn execute(config_path: Option<&Path>, write: Option<&Path>) -> Result<()> {
    let config = config::load(config_path)?;

    match write {
        Some(target) => {
            config::save(target, &config)?;
            println!("{} wrote {}", "✓".green(), target.display());
        }
        None => {
            let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            print!("{text}");
        }
    }
    Ok(())
}
