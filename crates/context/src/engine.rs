//! The context engine.
//!
//! A pure decision function: given a [`SignalState`] snapshot and an action
//! name it returns a [`Verdict`] saying whether a reminder may be shown now.
//! The engine holds no mutable state and performs no I/O besides logging.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::SignalState;
use crate::rules::{Rule, RuleInput};
use crate::settings::ContextSettings;

const FALLBACK_REASON: &str = "no clear window yet";
const BYPASS_REASON: &str = "context checks disabled";

/// The outcome of a context check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    admit: bool,
    reason: String,
    rule: Option<Rule>,
}

impl Verdict {
    pub fn admit(reason: impl Into<String>, rule: Option<Rule>) -> Self {
        Self {
            admit: true,
            reason: reason.into(),
            rule,
        }
    }

    pub fn deny(reason: impl Into<String>, rule: Option<Rule>) -> Self {
        Self {
            admit: false,
            reason: reason.into(),
            rule,
        }
    }

    pub fn is_admitted(&self) -> bool {
        self.admit
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The rule that decided, `None` for the fallback or the bypass.
    pub fn rule(&self) -> Option<Rule> {
        self.rule
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = if self.admit { "admit" } else { "deny" };
        write!(f, "{word}: {}", self.reason)
    }
}

/// Evaluates an ordered rule list against signal snapshots.
#[derive(Debug, Clone)]
pub struct ContextEngine {
    settings: ContextSettings,
    rules: Vec<Rule>,
}

impl ContextEngine {
    /// Build an engine with the standard rule order.
    ///
    /// When keyword blocking is disabled the intense-moment rule is left
    /// out of the list entirely.
    pub fn new(settings: &ContextSettings) -> Self {
        let rules = Rule::STANDARD
            .into_iter()
            .filter(|rule| settings.block_on_keywords || *rule != Rule::IntenseMoment)
            .collect();
        Self {
            settings: settings.clone(),
            rules,
        }
    }

    /// Replace the rule order.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// Decide whether `action` may interrupt the stream at `now`.
    ///
    /// Rules run in order and the first one that fires decides. If none
    /// fires the verdict is a deny with "no clear window yet".
    pub fn is_good_time_for(&self, action: &str, state: &SignalState, now: DateTime<Utc>) -> Verdict {
        if !self.settings.wait_for_quiet {
            debug!(action, "Context checks disabled, admitting");
            return Verdict::admit(BYPASS_REASON, None);
        }

        let input = RuleInput {
            action,
            state,
            now,
            settings: &self.settings,
        };

        let verdict = self
            .rules
            .iter()
            .find_map(|rule| rule.evaluate(&input))
            .unwrap_or_else(|| Verdict::deny(FALLBACK_REASON, None));

        debug!(
            action,
            admit = verdict.is_admitted(),
            reason = %verdict.reason(),
            rule = ?verdict.rule(),
            velocity = state.chat_velocity,
            voice_active = state.voice_active,
            "Context verdict"
        );

        verdict
    }
}
