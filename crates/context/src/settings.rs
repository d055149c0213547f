//! Immutable, validated context settings.

use chrono::Duration;
use streamcoach_config::ContextConfig;

/// Context thresholds with durations resolved, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSettings {
    pub high_velocity_threshold: f64,
    pub low_velocity_threshold: f64,
    pub velocity_window: Duration,
    pub keyword_lookback: Duration,
    pub silence_window: Duration,
    pub snooze_cooldown: Duration,
    pub block_on_keywords: bool,
    pub wait_for_quiet: bool,
}

impl From<&ContextConfig> for ContextSettings {
    fn from(config: &ContextConfig) -> Self {
        Self {
            high_velocity_threshold: config.high_velocity_threshold,
            low_velocity_threshold: config.low_velocity_threshold,
            velocity_window: seconds(config.velocity_window_seconds),
            keyword_lookback: seconds(config.keyword_lookback_seconds),
            silence_window: seconds(config.silence_window_seconds),
            snooze_cooldown: seconds(config.snooze_cooldown_seconds),
            block_on_keywords: config.block_on_keywords,
            wait_for_quiet: config.wait_for_quiet,
        }
    }
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self::from(&ContextConfig::default())
    }
}

/// Seconds from config, saturating instead of overflowing.
pub(crate) fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_default_config() {
        let settings = ContextSettings::default();
        assert_eq!(settings.velocity_window, Duration::seconds(60));
        assert_eq!(settings.silence_window, Duration::seconds(30));
        assert_eq!(settings.snooze_cooldown, Duration::seconds(600));
        assert!(settings.wait_for_quiet);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(seconds(u64::MAX), Duration::MAX);
    }
}
