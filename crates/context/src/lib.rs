//! Context awareness — deciding when a reminder may interrupt the stream.
//!
//! Two halves:
//!
//! - The [`SignalAggregator`] owns rolling windows over chat, keyword,
//!   voice and snooze signals and produces immutable [`SignalState`]
//!   snapshots.
//! - The [`ContextEngine`] is a pure function of a snapshot: it walks an
//!   ordered list of named [`Rule`]s and returns the first [`Verdict`] that
//!   fires, blockers strictly before enablers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │   Sources    │───▶│  Aggregator  │───▶│  Snapshot    │
//! │ chat / voice │    │  (windows)   │    │ SignalState  │
//! └─────────────┘    └──────────────┘    └──────┬──────┘
//!                                               │
//!                                        ┌──────┴──────┐
//!                                        │   Engine     │
//!                                        │ snoozed      │ blockers
//!                                        │ popping off  │
//!                                        │ intense      │
//!                                        │ talking      │
//!                                        │ quiet        │ enablers
//!                                        │ pause        │
//!                                        └──────┬──────┘
//!                                               │
//!                                           Verdict
//! ```

mod aggregator;
mod engine;
mod keywords;
mod rules;
mod settings;

pub use aggregator::{SignalAggregator, SignalState};
pub use engine::{ContextEngine, Verdict};
pub use keywords::KeywordMatcher;
pub use rules::{Rule, RuleInput, RuleKind};
pub use settings::ContextSettings;
