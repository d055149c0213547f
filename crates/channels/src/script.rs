//! Scripted replay — a TOML timeline of stream events.
//!
//! Scripts drive demos, `streamcoach simulate`, and the end-to-end tests:
//!
//! ```toml
//! name = "boss fight"
//! duration_seconds = 600
//!
//! [[timers]]       # optional, replaces the configured timers
//! name = "hydration"
//! interval_minutes = 5
//!
//! [[events]]
//! at = 0
//! type = "chat"
//! sender = "viewer"
//! text = "hi!"
//! repeat = 30      # thirty messages...
//! every = 1        # ...one per second
//!
//! [[events]]
//! at = 45
//! type = "voice"
//! active = true
//!
//! [[events]]
//! at = 120
//! type = "command"
//! text = "!snooze hydration 5"
//! ```
//!
//! `at` and `every` are seconds from the start of the replay.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use streamcoach_config::TimerConfig;
use streamcoach_core::error::SourceError;
use streamcoach_core::signal::SignalEvent;
use streamcoach_core::source::{SignalSource, SourceId};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Seconds of quiet appended after the last event when no duration is given.
const DEFAULT_TAIL_SECONDS: u64 = 60;

/// Errors from loading a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse script: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid script event #{index}: {reason}")]
    InvalidEvent { index: usize, reason: String },
}

/// What a script entry does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    /// A viewer chat message
    Chat {
        #[serde(default = "default_sender")]
        sender: String,
        text: String,
    },
    /// A line typed by the streamer (commands like `!snooze` work here)
    Command { text: String },
    /// Voice activity changed
    Voice { active: bool },
}

fn default_sender() -> String {
    "viewer".into()
}

/// Most copies a single entry may expand into.
pub const MAX_REPEAT: u32 = 10_000;

/// Most events a whole script may expand into.
pub const MAX_TIMELINE_EVENTS: u64 = 100_000;

fn one() -> u32 {
    1
}

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Seconds from the start
    pub at: u64,

    #[serde(flatten)]
    pub step: ScriptStep,

    /// How many times to emit the step
    #[serde(default = "one")]
    pub repeat: u32,

    /// Seconds between repeats
    #[serde(default)]
    pub every: u64,
}

/// A parsed, validated script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Total replay length; defaults to one minute past the last event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,

    /// Timers to use instead of the configured ones while simulating
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timers: Vec<TimerConfig>,

    #[serde(default)]
    pub events: Vec<ScriptEntry>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        let script: Self = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let mut total: u64 = 0;
        for (index, entry) in self.events.iter().enumerate() {
            let invalid = |reason: &str| ScriptError::InvalidEvent {
                index,
                reason: reason.into(),
            };
            if entry.repeat == 0 {
                return Err(invalid("repeat must be at least 1"));
            }
            if entry.repeat > MAX_REPEAT {
                return Err(invalid(&format!("repeat must be at most {MAX_REPEAT}")));
            }
            total += u64::from(entry.repeat);
            if total > MAX_TIMELINE_EVENTS {
                return Err(invalid(&format!(
                    "script expands to more than {MAX_TIMELINE_EVENTS} events"
                )));
            }
            match &entry.step {
                ScriptStep::Chat { text, .. } | ScriptStep::Command { text }
                    if text.trim().is_empty() =>
                {
                    return Err(invalid("text cannot be empty"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Offset of the last emitted event.
    fn last_offset(&self) -> u64 {
        self.events
            .iter()
            .map(|e| e.at.saturating_add(e.every.saturating_mul(u64::from(e.repeat).saturating_sub(1))))
            .max()
            .unwrap_or(0)
    }

    /// Replay length in seconds.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
            .unwrap_or_else(|| self.last_offset().saturating_add(DEFAULT_TAIL_SECONDS))
    }

    /// Expand the script into timestamped events, ordered by time.
    ///
    /// `streamer` is the sender used for command lines.
    pub fn timeline(&self, start: DateTime<Utc>, streamer: &str) -> Vec<(DateTime<Utc>, SignalEvent)> {
        let mut out = Vec::new();

        for entry in &self.events {
            for n in 0..u64::from(entry.repeat.min(MAX_REPEAT)) {
                let offset = entry.at.saturating_add(entry.every.saturating_mul(n));
                let at = start
                    .checked_add_signed(seconds(offset))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                let event = match &entry.step {
                    ScriptStep::Chat { sender, text } => SignalEvent::chat(at, sender.clone(), text.clone()),
                    ScriptStep::Command { text } => SignalEvent::Chat {
                        timestamp: at,
                        sender: streamer.to_string(),
                        text: text.clone(),
                        from_streamer: true,
                    },
                    ScriptStep::Voice { active } => SignalEvent::voice(at, *active),
                };
                out.push((at, event));
            }
        }

        // Stable: same-second entries keep file order
        out.sort_by_key(|(at, _)| *at);
        out
    }
}

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Replays a script in real time.
///
/// Events are stamped with the wall-clock time they are sent. The stream
/// closes once the script's duration has elapsed.
pub struct ScriptSource {
    id: SourceId,
    script: Script,
    streamer: String,
}

impl ScriptSource {
    pub fn new(script: Script, streamer: impl Into<String>) -> Self {
        let id = match &script.name {
            Some(name) => SourceId(format!("script:{name}")),
            None => SourceId("script".into()),
        };
        Self {
            id,
            script,
            streamer: streamer.into(),
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

#[async_trait]
impl SignalSource for ScriptSource {
    fn name(&self) -> &str {
        "script"
    }

    fn id(&self) -> &SourceId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<SignalEvent, SourceError>>, SourceError> {
        let (tx, rx) = mpsc::channel(64);
        let started = Utc::now();
        let origin = tokio::time::Instant::now();
        let timeline = self.script.timeline(started, &self.streamer);
        let total = std::time::Duration::from_secs(self.script.duration_seconds());

        info!(events = timeline.len(), seconds = total.as_secs(), "Replaying script");

        tokio::spawn(async move {
            for (at, event) in timeline {
                let offset = (at - started).to_std().unwrap_or_default();
                tokio::time::sleep_until(origin + offset).await;
                let event = restamp(event, Utc::now());
                if tx.send(Ok(event)).await.is_err() {
                    return;
                }
            }
            tokio::time::sleep_until(origin + total).await;
            debug!("Script finished");
        });

        Ok(rx)
    }
}

fn restamp(event: SignalEvent, now: DateTime<Utc>) -> SignalEvent {
    match event {
        SignalEvent::Chat {
            sender,
            text,
            from_streamer,
            ..
        } => SignalEvent::Chat {
            timestamp: now,
            sender,
            text,
            from_streamer,
        },
        SignalEvent::Voice { active, .. } => SignalEvent::voice(now, active),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
name = "raid"
duration_seconds = 300

[[timers]]
name = "hydration"
interval_minutes = 2

[[events]]
at = 10
type = "chat"
text = "hello"
repeat = 3
every = 2

[[events]]
at = 5
type = "voice"
active = true

[[events]]
at = 11
type = "command"
text = "!snooze all 5"
"#;

    fn t0() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn parse_script() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.name.as_deref(), Some("raid"));
        assert_eq!(script.events.len(), 3);
        assert_eq!(
            script.events[0].step,
            ScriptStep::Chat {
                sender: "viewer".into(),
                text: "hello".into()
            }
        );
        assert_eq!(script.events[0].repeat, 3);
        assert_eq!(script.duration_seconds(), 300);
        assert_eq!(script.timers, [TimerConfig::new("hydration", 2)]);
    }

    #[test]
    fn timeline_is_sorted_and_expanded() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let timeline = script.timeline(t0(), "owner");

        let offsets: Vec<i64> = timeline.iter().map(|(at, _)| (*at - t0()).num_seconds()).collect();
        assert_eq!(offsets, [5, 10, 11, 12, 14]);

        let (_, command) = &timeline[2];
        assert!(matches!(
            command,
            SignalEvent::Chat { sender, from_streamer: true, .. } if sender == "owner"
        ));
        assert_eq!(timeline[0].1, SignalEvent::voice(t0() + Duration::seconds(5), true));
    }

    #[test]
    fn default_duration_follows_last_event() {
        let script = Script::from_toml_str(
            r#"
[[events]]
at = 100
type = "chat"
text = "gg"
repeat = 5
every = 10
"#,
        )
        .unwrap();
        assert_eq!(script.duration_seconds(), 140 + DEFAULT_TAIL_SECONDS);
    }

    #[test]
    fn empty_text_rejected() {
        let err = Script::from_toml_str(
            r#"
[[events]]
at = 0
type = "command"
text = "  "
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidEvent { index: 0, .. }));
    }

    #[test]
    fn zero_repeat_rejected() {
        let err = Script::from_toml_str(
            r#"
[[events]]
at = 0
type = "voice"
active = false
repeat = 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("repeat"));
    }

    #[test]
    fn huge_repeat_rejected() {
        let err = Script::from_toml_str(
            r#"
[[events]]
at = 0
type = "chat"
text = "spam"
repeat = 4294967295
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidEvent { index: 0, .. }));
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn total_expansion_is_bounded() {
        let mut content = String::new();
        for _ in 0..11 {
            content.push_str("[[events]]\nat = 0\ntype = \"chat\"\ntext = \"spam\"\nrepeat = 10000\n\n");
        }
        let err = Script::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidEvent { index: 10, .. }));
    }

    #[test]
    fn unknown_type_is_parse_error() {
        let err = Script::from_toml_str(
            r#"
[[events]]
at = 0
type = "dance"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(&path, SCRIPT).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(script.events.len(), 3);

        let missing = Script::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ScriptError::ReadError { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn source_replays_then_closes() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let source = ScriptSource::new(script, "owner");
        assert_eq!(source.id().0, "script:raid");

        let mut rx = source.start().await.unwrap();
        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.unwrap().kind());
        }
        assert_eq!(kinds, ["voice", "chat", "chat", "chat", "chat"]);
    }
}
