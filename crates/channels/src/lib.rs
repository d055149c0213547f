//! Signal sources and notifiers for StreamCoach.
//!
//! Sources observe the stream and emit signal events; notifiers put approved
//! reminders in front of the streamer. Both sit behind the core traits so the
//! scheduler never knows which concrete backend it talks to.
//!
//! Available backends:
//! - **Console** — stdin lines become chat, `/` lines become streamer commands
//! - **Script** — replays a TOML timeline of chat, voice and command events
//! - **Registry** — starts every source and merges them into one queue
//! - **Console notifier** — titled terminal banner, optional bell

pub mod console;
pub mod notify;
pub mod registry;
pub mod script;

pub use console::ConsoleSource;
pub use notify::ConsoleNotifier;
pub use registry::SourceRegistry;
pub use script::{Script, ScriptError, ScriptSource, ScriptStep};
