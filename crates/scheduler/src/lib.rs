//! Scheduler — timers, the tick that gates them on context, and the service
//! that owns both.
//!
//! Each timer counts down independently. On every tick the scheduler asks
//! the context engine about each due timer; an admitted reminder goes to the
//! notifier and restarts its countdown, a denied one waits for the next tick.

mod scheduler;
mod service;
mod timers;

pub use scheduler::{Decision, Scheduler, TickReport};
pub use service::CoachService;
pub use timers::{Timer, TimerRegistry};
