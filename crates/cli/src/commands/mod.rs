//! Subcommand implementations.

use std::path::{Path, PathBuf};

use streamcoach_config::{AppConfig, ConfigError};

pub mod completions;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod run;
pub mod simulate;
pub mod status;

/// Load config from `--config` (or `STREAMCOACH_CONFIG`), else the default path.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    }
}

/// The config file a command is working against.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path)
}

/// `1h 05m`, `12m 30s`, `45s`.
pub fn human_duration(d: chrono::Duration) -> String {
    let secs = d.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
