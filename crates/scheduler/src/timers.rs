//! Per-action countdowns, independent of stream context.

use chrono::{DateTime, Duration, Utc};
use streamcoach_config::TimerConfig;
use streamcoach_core::ALL_ACTIONS;
use tracing::{debug, info};

/// A single reminder countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    /// Action name, lowercase (e.g. "hydration")
    pub action: String,

    /// Time between reminders. Zero disables the timer.
    pub interval: Duration,

    /// When the timer was registered; the first reminder counts from here
    pub registered_at: DateTime<Utc>,

    /// When a reminder was last delivered or the timer was reset
    pub last_fired: Option<DateTime<Utc>>,

    pub title: String,
    pub message: String,
}

impl Timer {
    pub fn new(action: impl Into<String>, interval: Duration, registered_at: DateTime<Utc>) -> Self {
        let action = normalize(&action.into());
        let config = TimerConfig::new(action.clone(), 0);
        Self {
            title: config.title(),
            message: config.message(),
            action,
            interval,
            registered_at,
            last_fired: None,
        }
    }

    /// Build a timer from its config entry.
    pub fn from_config(config: &TimerConfig, registered_at: DateTime<Utc>) -> Self {
        let interval = Duration::try_minutes(config.interval_minutes.max(0)).unwrap_or(Duration::MAX);
        Self {
            action: normalize(&config.name),
            interval,
            registered_at,
            last_fired: None,
            title: config.title(),
            message: config.message(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > Duration::zero()
    }

    fn anchor(&self) -> DateTime<Utc> {
        self.last_fired.unwrap_or(self.registered_at)
    }

    /// Time since the last delivery (or registration), never negative.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.anchor()).max(Duration::zero())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_enabled() && self.elapsed(now) >= self.interval
    }

    /// Time left until due, zero once due, `None` when disabled.
    pub fn time_until_due(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.is_enabled()
            .then(|| (self.interval - self.elapsed(now)).max(Duration::zero()))
    }
}

fn normalize(action: &str) -> String {
    action.trim().to_lowercase()
}

/// All registered timers, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every configured timer at `now`, disabled ones included.
    pub fn from_config(configs: &[TimerConfig], now: DateTime<Utc>) -> Self {
        let mut registry = Self::new();
        for config in configs {
            registry.insert(Timer::from_config(config, now));
        }
        registry
    }

    /// Register `action` with `interval`, counting from `now`.
    pub fn register(&mut self, action: impl Into<String>, interval: Duration, now: DateTime<Utc>) {
        self.insert(Timer::new(action, interval, now));
    }

    /// Add a timer. Re-registering an action replaces it in place.
    pub fn insert(&mut self, timer: Timer) {
        debug!(
            action = %timer.action,
            interval_minutes = timer.interval.num_minutes(),
            enabled = timer.is_enabled(),
            "Registering timer"
        );
        match self.timers.iter_mut().find(|t| t.action == timer.action) {
            Some(existing) => *existing = timer,
            None => self.timers.push(timer),
        }
    }

    pub fn get(&self, action: &str) -> Option<&Timer> {
        let action = normalize(action);
        self.timers.iter().find(|t| t.action == action)
    }

    fn get_mut(&mut self, action: &str) -> Option<&mut Timer> {
        let action = normalize(action);
        self.timers.iter_mut().find(|t| t.action == action)
    }

    /// Elapsed time for `action`; zero for unknown actions.
    pub fn elapsed_since_last(&self, action: &str, now: DateTime<Utc>) -> Duration {
        self.get(action)
            .map(|t| t.elapsed(now))
            .unwrap_or_else(Duration::zero)
    }

    pub fn is_due(&self, action: &str, now: DateTime<Utc>) -> bool {
        self.get(action).is_some_and(|t| t.is_due(now))
    }

    pub fn time_until_due(&self, action: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.get(action).and_then(|t| t.time_until_due(now))
    }

    /// Record a delivered reminder. Only call after an admitted verdict.
    pub fn mark_fired(&mut self, action: &str, now: DateTime<Utc>) -> bool {
        match self.get_mut(action) {
            Some(timer) => {
                timer.last_fired = Some(now);
                true
            }
            None => false,
        }
    }

    /// Restart a countdown by hand. `*` restarts all of them.
    pub fn reset(&mut self, action: &str, now: DateTime<Utc>) -> bool {
        if action == ALL_ACTIONS {
            for timer in &mut self.timers {
                timer.last_fired = Some(now);
            }
            info!(count = self.timers.len(), "All timers reset");
            return !self.timers.is_empty();
        }

        match self.get_mut(action) {
            Some(timer) => {
                timer.last_fired = Some(now);
                info!(action = %timer.action, "Timer reset");
                true
            }
            None => false,
        }
    }

    /// Due timers in registration order.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<&Timer> {
        self.timers.iter().filter(|t| t.is_due(now)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
