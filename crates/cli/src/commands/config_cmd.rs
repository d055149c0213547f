//! `streamcoach config` — Configuration management commands.

use std::path::Path;

use super::{config_file, load_config};

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");
            println!();
            println!("   Streamer:  {}", config.streamer.as_deref().unwrap_or("(not set)"));
            println!("   Timers:    {} ({} active)", config.timers.len(), config.active_timers().count());
            println!("   Keywords:  {}", config.context.keywords.len());
            println!(
                "   Velocity:  quiet ≤ {} · hype ≥ {} msgs/min",
                config.context.low_velocity_threshold, config.context.high_velocity_threshold
            );
            println!("   Tick:      {}s", config.scheduler.tick_seconds);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_file(config_path).display());
    Ok(())
}
