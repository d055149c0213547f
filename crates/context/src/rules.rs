//! Named context rules, evaluated in order.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::SignalState;
use crate::engine::Verdict;
use crate::settings::ContextSettings;

/// Whether a rule can only deny or only admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Blocker,
    Enabler,
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub action: &'a str,
    pub state: &'a SignalState,
    pub now: DateTime<Utc>,
    pub settings: &'a ContextSettings,
}

/// A single named predicate over the signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Snoozed,
    ChatPoppingOff,
    IntenseMoment,
    StreamerTalking,
    ChatQuiet,
    NaturalPause,
}

impl Rule {
    /// Blockers first, then enablers.
    pub const STANDARD: [Rule; 6] = [
        Rule::Snoozed,
        Rule::ChatPoppingOff,
        Rule::IntenseMoment,
        Rule::StreamerTalking,
        Rule::ChatQuiet,
        Rule::NaturalPause,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Snoozed => "snoozed",
            Rule::ChatPoppingOff => "chat_popping_off",
            Rule::IntenseMoment => "intense_moment",
            Rule::StreamerTalking => "streamer_talking",
            Rule::ChatQuiet => "chat_quiet",
            Rule::NaturalPause => "natural_pause",
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Snoozed | Rule::ChatPoppingOff | Rule::IntenseMoment | Rule::StreamerTalking => {
                RuleKind::Blocker
            }
            Rule::ChatQuiet | Rule::NaturalPause => RuleKind::Enabler,
        }
    }

    /// The reason attached to the verdict when this rule fires.
    pub fn reason(&self) -> &'static str {
        match self {
            Rule::Snoozed => "snoozed",
            Rule::ChatPoppingOff => "chat is popping off",
            Rule::IntenseMoment => "intense moment detected",
            Rule::StreamerTalking => "streamer talking",
            Rule::ChatQuiet => "chat is quiet",
            Rule::NaturalPause => "natural pause",
        }
    }

    fn holds(&self, input: &RuleInput<'_>) -> bool {
        let RuleInput {
            action,
            state,
            now,
            settings,
        } = *input;

        match self {
            Rule::Snoozed => state.is_snoozed(action, now),
            Rule::ChatPoppingOff => state.chat_velocity >= settings.high_velocity_threshold,
            Rule::IntenseMoment => state
                .since_keyword(now)
                .is_some_and(|age| age.max(Duration::zero()) < settings.keyword_lookback),
            Rule::StreamerTalking => state.voice_active,
            Rule::ChatQuiet => state.chat_velocity <= settings.low_velocity_threshold,
            Rule::NaturalPause => state
                .silent_for(now)
                .is_some_and(|silence| silence >= settings.silence_window),
        }
    }

    /// `Some(verdict)` when the rule fires, `None` to fall through.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Option<Verdict> {
        if !self.holds(input) {
            return None;
        }
        Some(match self.kind() {
            RuleKind::Blocker => Verdict::deny(self.reason(), Some(*self)),
            RuleKind::Enabler => Verdict::admit(self.reason(), Some(*self)),
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
