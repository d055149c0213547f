//! SignalSource trait — the abstraction over chat and voice inputs.
//!
//! A SignalSource connects StreamCoach to something that can observe the
//! stream (a chat connection, a voice-activity detector, the local console,
//! a replay script). Sources never touch coach state: they only emit
//! [`SignalEvent`]s into a channel that a single owner drains.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::SourceError;
use crate::signal::SignalEvent;

/// Unique identifier for a source instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The core SignalSource trait.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Human-readable source name (e.g., "console", "script").
    fn name(&self) -> &str;

    /// Unique ID for this source instance.
    fn id(&self) -> &SourceId;

    /// Start producing events.
    ///
    /// Returns a receiver that yields events until the source is exhausted
    /// or stopped. Polling and connection handling happen internally.
    async fn start(
        &self,
    ) -> std::result::Result<mpsc::Receiver<std::result::Result<SignalEvent, SourceError>>, SourceError>;

    /// Stop the source gracefully.
    async fn stop(&self) -> std::result::Result<(), SourceError> {
        Ok(())
    }

    /// Health check — is the source connected and producing?
    async fn health_check(&self) -> std::result::Result<bool, SourceError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_display() {
        let id = SourceId("console".into());
        assert_eq!(id.to_string(), "console");
    }
}
