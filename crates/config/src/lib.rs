//! Configuration loading, validation, and management for StreamCoach.
//!
//! Loads configuration from `~/.streamcoach/config.toml` with environment
//! variable overrides. Validates all settings once at startup; a config that
//! fails validation is fatal, the process never runs with half-valid settings.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.streamcoach/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Channel owner's chat name. Messages from this account may carry
    /// `!snooze` / `!reset` commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamer: Option<String>,

    /// Context-awareness thresholds
    #[serde(default)]
    pub context: ContextConfig,

    /// Scheduler loop settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Console logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Self-care timers, one per action
    #[serde(default = "default_timers")]
    pub timers: Vec<TimerConfig>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Chat velocity (msgs/min) at or above which chat counts as hype
    #[serde(default = "default_high_velocity")]
    pub high_velocity_threshold: f64,

    /// Chat velocity (msgs/min) at or below which chat counts as quiet
    #[serde(default = "default_low_velocity")]
    pub low_velocity_threshold: f64,

    /// Trailing window used to compute chat velocity
    #[serde(default = "default_velocity_window")]
    pub velocity_window_seconds: u64,

    /// Words that mark an intense moment (case-insensitive substring match)
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Whether a recent keyword blocks reminders
    #[serde(default = "default_true")]
    pub block_on_keywords: bool,

    /// How long a keyword hit keeps blocking reminders
    #[serde(default = "default_keyword_lookback")]
    pub keyword_lookback_seconds: u64,

    /// Voice silence needed before a pause counts as natural
    #[serde(default = "default_silence_window")]
    pub silence_window_seconds: u64,

    /// Snooze length when a snooze command names no duration
    #[serde(default = "default_snooze_cooldown")]
    pub snooze_cooldown_seconds: u64,

    /// `false` bypasses every context check and delivers reminders as soon
    /// as they are due
    #[serde(default = "default_true")]
    pub wait_for_quiet: bool,
}

fn default_high_velocity() -> f64 {
    10.0
}
fn default_low_velocity() -> f64 {
    2.0
}
fn default_velocity_window() -> u64 {
    60
}
fn default_keywords() -> Vec<String> {
    vec![
        "hype".into(),
        "pog".into(),
        "lets go".into(),
        "amazing".into(),
        "incredible".into(),
    ]
}
fn default_keyword_lookback() -> u64 {
    60
}
fn default_silence_window() -> u64 {
    30
}
/// Longest default snooze a config may ask for.
pub const MAX_SNOOZE_COOLDOWN_SECONDS: u64 = 7 * 24 * 60 * 60;

fn default_snooze_cooldown() -> u64 {
    600
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            high_velocity_threshold: default_high_velocity(),
            low_velocity_threshold: default_low_velocity(),
            velocity_window_seconds: default_velocity_window(),
            keywords: default_keywords(),
            block_on_keywords: true,
            keyword_lookback_seconds: default_keyword_lookback(),
            silence_window_seconds: default_silence_window(),
            snooze_cooldown_seconds: default_snooze_cooldown(),
            wait_for_quiet: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler ticks
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

fn default_tick_seconds() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Ring the terminal bell with each reminder
    #[serde(default = "default_true")]
    pub sound: bool,
}

fn default_app_name() -> String {
    "Coach".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            sound: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Echo every chat message to the console
    #[serde(default)]
    pub show_chat: bool,

    /// Print timer status and deliveries
    #[serde(default = "default_true")]
    pub show_timers: bool,

    /// Debug-level logging (same as `--verbose`)
    #[serde(default)]
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            show_chat: false,
            show_timers: true,
            debug: false,
        }
    }
}

/// Configuration for one self-care timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Action name (e.g. "break", "hydration")
    pub name: String,

    /// Minutes between reminders. `0` disables the timer.
    pub interval_minutes: i64,

    /// Notification headline (defaults per well-known action)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Notification body (defaults per well-known action)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TimerConfig {
    pub fn new(name: impl Into<String>, interval_minutes: i64) -> Self {
        Self {
            name: name.into(),
            interval_minutes,
            title: None,
            message: None,
        }
    }

    /// Headline for this timer's reminders.
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        match self.name.trim().to_lowercase().as_str() {
            "break" => "Break Time",
            "hydration" => "Hydration Check",
            "posture" => "Posture Check",
            "duration" => "Stream Duration",
            _ => "Reminder",
        }
        .into()
    }

    /// Body text for this timer's reminders.
    pub fn message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.name.trim().to_lowercase().as_str() {
            "break" => "Time for a break! Stand up, stretch, rest your eyes.".into(),
            "hydration" => "Stay hydrated! Take a sip of water.".into(),
            "posture" => "Posture check! Sit up straight, relax your shoulders.".into(),
            "duration" => "You've been streaming for a while. Consider wrapping up soon.".into(),
            other => format!("Time for your {other} reminder."),
        }
    }
}

fn default_timers() -> Vec<TimerConfig> {
    vec![
        TimerConfig::new("break", 120),
        TimerConfig::new("hydration", 45),
        TimerConfig::new("posture", 90),
        TimerConfig::new("duration", 240),
    ]
}

impl AppConfig {
    /// Load configuration from the default path (~/.streamcoach/config.toml).
    ///
    /// Environment overrides:
    /// - `STREAMCOACH_CONFIG` — alternative config file path
    /// - `STREAMCOACH_STREAMER` — channel owner name
    /// - `STREAMCOACH_WAIT_FOR_QUIET` — `true`/`false`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STREAMCOACH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_path());
        Self::load_with_overrides(&path)
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(streamer) = std::env::var("STREAMCOACH_STREAMER") {
            if !streamer.trim().is_empty() {
                config.streamer = Some(streamer.trim().to_string());
            }
        }

        if let Ok(raw) = std::env::var("STREAMCOACH_WAIT_FOR_QUIET") {
            config.context.wait_for_quiet = parse_bool(&raw).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "STREAMCOACH_WAIT_FOR_QUIET must be true or false, got '{raw}'"
                ))
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".streamcoach")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ctx = &self.context;

        for (name, value) in [
            ("high_velocity_threshold", ctx.high_velocity_threshold),
            ("low_velocity_threshold", ctx.low_velocity_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "context.{name} must be a non-negative number"
                )));
            }
        }

        if ctx.low_velocity_threshold > ctx.high_velocity_threshold {
            return Err(ConfigError::ValidationError(
                "context.low_velocity_threshold must not exceed high_velocity_threshold".into(),
            ));
        }

        if ctx.velocity_window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "context.velocity_window_seconds must be > 0".into(),
            ));
        }

        if ctx.snooze_cooldown_seconds > MAX_SNOOZE_COOLDOWN_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "context.snooze_cooldown_seconds must be <= {MAX_SNOOZE_COOLDOWN_SECONDS} (one week)"
            )));
        }

        if ctx.block_on_keywords && ctx.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "context.keywords is empty but block_on_keywords = true".into(),
            ));
        }

        if self.scheduler.tick_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "scheduler.tick_seconds must be > 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for timer in &self.timers {
            let name = timer.name.trim();
            if name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "timer name cannot be empty".into(),
                ));
            }
            if name == "*" || name.eq_ignore_ascii_case("all") {
                return Err(ConfigError::ValidationError(format!(
                    "timer name '{name}' is reserved"
                )));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate timer '{name}'"
                )));
            }
            if timer.interval_minutes < 0 {
                return Err(ConfigError::ValidationError(format!(
                    "timer '{name}': interval_minutes must be >= 0 (0 disables it)"
                )));
            }
        }

        Ok(())
    }

    /// Timers with a non-zero interval.
    pub fn active_timers(&self) -> impl Iterator<Item = &TimerConfig> {
        self.timers.iter().filter(|t| t.interval_minutes > 0)
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            streamer: None,
            context: ContextConfig::default(),
            scheduler: SchedulerConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
            timers: default_timers(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timers.len(), 4);
        assert_eq!(config.scheduler.tick_seconds, 10);
        assert!(config.context.wait_for_quiet);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = AppConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.timers.len(), config.timers.len());
        assert_eq!(
            parsed.context.high_velocity_threshold,
            config.context.high_velocity_threshold
        );
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.context.keywords.len(), 5);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
streamer = "arcade_andy"

[context]
high_velocity_threshold = 12.5
keywords = ["boss", "clutch"]

[[timers]]
name = "hydration"
interval_minutes = 30
title = "Drink!"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.streamer.as_deref(), Some("arcade_andy"));
        assert_eq!(config.context.high_velocity_threshold, 12.5);
        assert_eq!(config.context.low_velocity_threshold, 2.0);
        assert_eq!(config.timers.len(), 1);
        assert_eq!(config.timers[0].title(), "Drink!");
        assert_eq!(config.timers[0].message(), "Stay hydrated! Take a sip of water.");
    }

    #[test]
    fn unparsable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[context\nbroken").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn negative_interval_rejected() {
        let mut config = AppConfig::default();
        config.timers[0].interval_minutes = -5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("interval_minutes"));
    }

    #[test]
    fn zero_interval_is_allowed_but_inactive() {
        let mut config = AppConfig::default();
        config.timers[3].interval_minutes = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.active_timers().count(), 3);
    }

    #[test]
    fn empty_keywords_rejected_when_blocking() {
        let mut config = AppConfig::default();
        config.context.keywords.clear();
        assert!(config.validate().is_err());

        config.context.block_on_keywords = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut config = AppConfig::default();
        config.context.low_velocity_threshold = 20.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_threshold_rejected() {
        let mut config = AppConfig::default();
        config.context.low_velocity_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_timer_rejected() {
        let mut config = AppConfig::default();
        config.timers.push(TimerConfig::new("Break", 10));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn reserved_timer_name_rejected() {
        let mut config = AppConfig::default();
        config.timers.push(TimerConfig::new("all", 10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tick_rejected() {
        let mut config = AppConfig::default();
        config.scheduler.tick_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_snooze_cooldown_rejected() {
        let mut config = AppConfig::default();
        config.context.snooze_cooldown_seconds = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("snooze_cooldown_seconds"));

        config.context.snooze_cooldown_seconds = MAX_SNOOZE_COOLDOWN_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builtin_text_ignores_name_case() {
        let timer = TimerConfig::new(" Hydration", 45);
        assert_eq!(timer.title(), "Hydration Check");
        assert_eq!(timer.message(), "Stay hydrated! Take a sip of water.");
    }

    #[test]
    fn unknown_timer_gets_generic_text() {
        let timer = TimerConfig::new("eyes", 20);
        assert_eq!(timer.title(), "Reminder");
        assert!(timer.message().contains("eyes"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("high_velocity_threshold"));
        assert!(toml_str.contains("hydration"));
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
