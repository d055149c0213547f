//! Signal events — everything the coach can observe about the stream.
//!
//! Sources (chat, voice activity, manual controls) translate their inputs
//! into [`SignalEvent`]s. All of them are funnelled into a single queue and
//! applied by one owner, so the event type is the only thing they share.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Action name that addresses every timer at once (e.g. `!snooze all`).
pub const ALL_ACTIONS: &str = "*";

/// A timestamped observation delivered by a signal source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalEvent {
    /// A chat message was posted.
    Chat {
        timestamp: DateTime<Utc>,
        sender: String,
        text: String,
        /// Whether the channel owner wrote this message.
        #[serde(default)]
        from_streamer: bool,
    },

    /// The voice-activity detector changed state.
    Voice {
        timestamp: DateTime<Utc>,
        active: bool,
    },

    /// Suppress reminders for `action` until `until`.
    Snooze {
        action: String,
        until: DateTime<Utc>,
    },

    /// Lift a snooze early.
    ClearSnooze { action: String },

    /// Manually restart a timer's countdown.
    ResetTimer {
        action: String,
        timestamp: DateTime<Utc>,
    },
}

impl SignalEvent {
    /// Build a chat event.
    pub fn chat(timestamp: DateTime<Utc>, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Chat {
            timestamp,
            sender: sender.into(),
            text: text.into(),
            from_streamer: false,
        }
    }

    /// Build a voice-activity event.
    pub fn voice(timestamp: DateTime<Utc>, active: bool) -> Self {
        Self::Voice { timestamp, active }
    }

    /// The time the event was observed, if it carries one.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Chat { timestamp, .. }
            | Self::Voice { timestamp, .. }
            | Self::ResetTimer { timestamp, .. } => Some(*timestamp),
            Self::Snooze { .. } | Self::ClearSnooze { .. } => None,
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Voice { .. } => "voice",
            Self::Snooze { .. } => "snooze",
            Self::ClearSnooze { .. } => "clear_snooze",
            Self::ResetTimer { .. } => "reset_timer",
        }
    }
}

/// A control command typed by the streamer, either in chat (`!snooze`) or
/// on the console (`/snooze`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `snooze <action|all> [minutes]`
    Snooze {
        action: String,
        minutes: Option<u64>,
    },
    /// `unsnooze <action|all>`
    Unsnooze { action: String },
    /// `reset <action>`
    Reset { action: String },
    /// `voice on|off`
    Voice(bool),
}

impl ChatCommand {
    /// Parse a command line starting with `!` or `/`.
    ///
    /// Returns `None` for ordinary chat and for commands that don't parse.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_prefix(['!', '/'])?;
        let mut words = body.split_whitespace();
        let verb = words.next()?.to_ascii_lowercase();
        let target = words.next().map(normalize_action);

        match verb.as_str() {
            "snooze" => {
                let action = target?;
                let minutes = match words.next() {
                    Some(raw) => Some(raw.parse().ok()?),
                    None => None,
                };
                Some(Self::Snooze { action, minutes })
            }
            "unsnooze" => Some(Self::Unsnooze { action: target? }),
            "reset" => Some(Self::Reset { action: target? }),
            "voice" => match target?.as_str() {
                "on" | "talking" => Some(Self::Voice(true)),
                "off" | "quiet" => Some(Self::Voice(false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Turn the command into the event it stands for.
    ///
    /// `default_snooze` applies when a snooze names no duration.
    pub fn into_event(self, now: DateTime<Utc>, default_snooze: Duration) -> SignalEvent {
        match self {
            Self::Snooze { action, minutes } => {
                let length = match minutes {
                    Some(m) => i64::try_from(m)
                        .ok()
                        .and_then(Duration::try_minutes)
                        .unwrap_or(Duration::MAX),
                    None => default_snooze,
                };
                // Saturates at the end of representable time
                let until = now.checked_add_signed(length).unwrap_or(DateTime::<Utc>::MAX_UTC);
                SignalEvent::Snooze { action, until }
            }
            Self::Unsnooze { action } => SignalEvent::ClearSnooze { action },
            Self::Reset { action } => SignalEvent::ResetTimer {
                action,
                timestamp: now,
            },
            Self::Voice(active) => SignalEvent::voice(now, active),
        }
    }
}

fn normalize_action(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    if lower == "all" { ALL_ACTIONS.to_string() } else { lower }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_snooze_with_minutes() {
        let cmd = ChatCommand::parse("!snooze Hydration 15").unwrap();
        assert_eq!(
            cmd,
            ChatCommand::Snooze {
                action: "hydration".into(),
                minutes: Some(15)
            }
        );
    }

    #[test]
    fn parse_snooze_all_without_minutes() {
        let cmd = ChatCommand::parse("/snooze all").unwrap();
        assert_eq!(
            cmd,
            ChatCommand::Snooze {
                action: ALL_ACTIONS.into(),
                minutes: None
            }
        );
    }

    #[test]
    fn parse_rejects_plain_chat_and_garbage() {
        assert!(ChatCommand::parse("snooze hydration").is_none());
        assert!(ChatCommand::parse("!snooze").is_none());
        assert!(ChatCommand::parse("!snooze break soon").is_none());
        assert!(ChatCommand::parse("!dance").is_none());
        assert!(ChatCommand::parse("/voice maybe").is_none());
    }

    #[test]
    fn parse_voice_and_reset() {
        assert_eq!(ChatCommand::parse("/voice on"), Some(ChatCommand::Voice(true)));
        assert_eq!(ChatCommand::parse("/voice off"), Some(ChatCommand::Voice(false)));
        assert_eq!(
            ChatCommand::parse("!reset break"),
            Some(ChatCommand::Reset {
                action: "break".into()
            })
        );
    }

    #[test]
    fn snooze_uses_default_length_when_unspecified() {
        let now = Utc::now();
        let event = ChatCommand::Snooze {
            action: "posture".into(),
            minutes: None,
        }
        .into_event(now, Duration::seconds(600));
        assert_eq!(
            event,
            SignalEvent::Snooze {
                action: "posture".into(),
                until: now + Duration::seconds(600)
            }
        );
    }

    #[test]
    fn oversized_snooze_saturates() {
        let now = Utc::now();
        let cmd = ChatCommand::parse("!snooze all 99999999999999").unwrap();
        let event = cmd.into_event(now, Duration::seconds(600));
        assert_eq!(
            event,
            SignalEvent::Snooze {
                action: ALL_ACTIONS.into(),
                until: DateTime::<Utc>::MAX_UTC
            }
        );

        let event = ChatCommand::Snooze {
            action: "break".into(),
            minutes: Some(u64::MAX),
        }
        .into_event(now, Duration::seconds(600));
        assert!(matches!(event, SignalEvent::Snooze { until, .. } if until == DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn unbounded_default_snooze_saturates() {
        let now = Utc::now();
        let event = ChatCommand::parse("!snooze all")
            .unwrap()
            .into_event(now, Duration::MAX);
        assert!(matches!(event, SignalEvent::Snooze { until, .. } if until == DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = SignalEvent::voice(Utc::now(), true);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"voice\""));
        assert_eq!(event.kind(), "voice");
        assert!(event.timestamp().is_some());
    }
}
