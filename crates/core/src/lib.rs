//! # StreamCoach Core
//!
//! Domain types, traits, and error definitions for the StreamCoach reminder
//! scheduler. This crate has **no runtime logic** beyond the event bus — it
//! defines the vocabulary every other crate speaks.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping chat sources and notifiers via configuration
//! - Easy testing with scripted sources and recording notifiers
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod notifier;
pub mod signal;
pub mod source;

// Re-export key types at crate root for ergonomics
pub use error::{Error, NotifyError, Result, SourceError};
pub use event::{CoachEvent, EventBus};
pub use notifier::{Notifier, Reminder};
pub use signal::{ALL_ACTIONS, ChatCommand, SignalEvent};
pub use source::{SignalSource, SourceId};
