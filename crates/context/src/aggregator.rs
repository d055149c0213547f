//! Signal aggregation — rolling windows over everything the coach observes.
//!
//! The aggregator is owned by exactly one task. It never rejects input:
//! timestamps that go backwards are clamped to the newest one already seen,
//! and timestamps from the future are read as "now" when a snapshot is taken.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use streamcoach_core::{ALL_ACTIONS, SignalEvent};
use tracing::trace;

use crate::keywords::KeywordMatcher;

/// Hard cap on retained chat timestamps.
const MAX_TRACKED_MESSAGES: usize = 10_000;

/// A read-only view of the aggregated signals at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalState {
    /// The instant this snapshot describes
    pub taken_at: DateTime<Utc>,
    /// Chat messages inside the velocity window
    pub message_count: usize,
    /// Messages per minute over the velocity window
    pub chat_velocity: f64,
    /// Most recent keyword hit
    pub last_keyword_at: Option<DateTime<Utc>>,
    pub last_keyword: Option<String>,
    pub voice_active: bool,
    /// When `voice_active` last flipped
    pub voice_changed_at: DateTime<Utc>,
    /// Unexpired snoozes, action → expiry
    pub snoozes: BTreeMap<String, DateTime<Utc>>,
}

impl SignalState {
    /// A neutral state: no chat, no keywords, voice silent since `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            taken_at: now,
            message_count: 0,
            chat_velocity: 0.0,
            last_keyword_at: None,
            last_keyword: None,
            voice_active: false,
            voice_changed_at: now,
            snoozes: BTreeMap::new(),
        }
    }

    /// Latest snooze expiry that applies to `action`, including `*`.
    pub fn snooze_until(&self, action: &str) -> Option<DateTime<Utc>> {
        let own = self.snoozes.get(&normalize_action(action)).copied();
        let all = self.snoozes.get(ALL_ACTIONS).copied();
        own.max(all)
    }

    pub fn is_snoozed(&self, action: &str, now: DateTime<Utc>) -> bool {
        self.snooze_until(action).is_some_and(|until| until > now)
    }

    /// Time since the last keyword hit.
    pub fn since_keyword(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_keyword_at.map(|at| now - at)
    }

    /// How long the streamer has been silent, `None` while talking.
    pub fn silent_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        (!self.voice_active).then(|| now - self.voice_changed_at)
    }
}

/// Owns the rolling signal windows.
#[derive(Debug, Clone)]
pub struct SignalAggregator {
    velocity_window: Duration,
    messages: VecDeque<DateTime<Utc>>,
    high_water: Option<DateTime<Utc>>,
    last_keyword: Option<(DateTime<Utc>, String)>,
    voice_active: bool,
    voice_changed_at: DateTime<Utc>,
    snoozes: BTreeMap<String, DateTime<Utc>>,
}

impl SignalAggregator {
    /// Create an aggregator. Voice counts as silent from `started_at`.
    pub fn new(velocity_window: Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            velocity_window,
            messages: VecDeque::new(),
            high_water: None,
            last_keyword: None,
            voice_active: false,
            voice_changed_at: started_at,
            snoozes: BTreeMap::new(),
        }
    }

    /// Keep observation times monotonic.
    fn clamp(&mut self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        match self.high_water {
            Some(mark) if timestamp < mark => {
                trace!(%timestamp, %mark, "Clamping out-of-order timestamp");
                mark
            }
            _ => {
                self.high_water = Some(timestamp);
                timestamp
            }
        }
    }

    pub fn record_message(&mut self, timestamp: DateTime<Utc>) {
        let timestamp = self.clamp(timestamp);
        self.messages.push_back(timestamp);
        if self.messages.len() > MAX_TRACKED_MESSAGES {
            self.messages.pop_front();
        }
    }

    pub fn record_keyword(&mut self, timestamp: DateTime<Utc>, keyword: impl Into<String>) {
        let timestamp = self.clamp(timestamp);
        self.last_keyword = Some((timestamp, keyword.into()));
    }

    /// Repeating the current state does not move the last-changed time.
    pub fn set_voice_active(&mut self, active: bool, timestamp: DateTime<Utc>) {
        let timestamp = self.clamp(timestamp);
        if active != self.voice_active {
            self.voice_active = active;
            self.voice_changed_at = timestamp;
        }
    }

    /// Suppress `action` (or `*`) until `until`. A later command replaces an
    /// earlier one, even if it is shorter.
    pub fn snooze(&mut self, action: impl AsRef<str>, until: DateTime<Utc>) {
        self.snoozes.insert(normalize_action(action.as_ref()), until);
    }

    /// Lift a snooze; `*` lifts all of them. Returns whether anything changed.
    pub fn clear_snooze(&mut self, action: &str) -> bool {
        let action = normalize_action(action);
        if action == ALL_ACTIONS {
            let had_any = !self.snoozes.is_empty();
            self.snoozes.clear();
            had_any
        } else {
            self.snoozes.remove(&action).is_some()
        }
    }

    /// Apply a signal event. Chat text is scanned for keywords; the keyword
    /// found, if any, is returned. Timer resets are not signal state and are
    /// ignored here.
    pub fn ingest(&mut self, event: &SignalEvent, matcher: &KeywordMatcher) -> Option<String> {
        match event {
            SignalEvent::Chat {
                timestamp, text, ..
            } => {
                self.record_message(*timestamp);
                let keyword = matcher.find(text)?.to_string();
                self.record_keyword(*timestamp, keyword.clone());
                Some(keyword)
            }
            SignalEvent::Voice { timestamp, active } => {
                self.set_voice_active(*active, *timestamp);
                None
            }
            SignalEvent::Snooze { action, until } => {
                self.snooze(action, *until);
                None
            }
            SignalEvent::ClearSnooze { action } => {
                self.clear_snooze(action);
                None
            }
            SignalEvent::ResetTimer { .. } => None,
        }
    }

    /// Evict stale entries and describe the signals as of `now`.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> SignalState {
        if let Some(cutoff) = now.checked_sub_signed(self.velocity_window) {
            while self.messages.front().is_some_and(|t| *t <= cutoff) {
                self.messages.pop_front();
            }
        }
        self.snoozes.retain(|_, until| *until > now);

        // Entries newer than `now` are counted as happening at `now`.
        let message_count = self.messages.len();
        let window_secs = self.velocity_window.num_milliseconds() as f64 / 1000.0;
        let chat_velocity = if window_secs > 0.0 {
            message_count as f64 * 60.0 / window_secs
        } else {
            0.0
        };

        let (last_keyword_at, last_keyword) = match &self.last_keyword {
            Some((at, keyword)) => (Some((*at).min(now)), Some(keyword.clone())),
            None => (None, None),
        };

        SignalState {
            taken_at: now,
            message_count,
            chat_velocity,
            last_keyword_at,
            last_keyword,
            voice_active: self.voice_active,
            voice_changed_at: self.voice_changed_at.min(now),
            snoozes: self.snoozes.clone(),
        }
    }
}

/// Snooze keys match timer names: trimmed and lowercased.
fn normalize_action(action: &str) -> String {
    action.trim().to_lowercase()
}
