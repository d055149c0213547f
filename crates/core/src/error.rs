//! Error types for the StreamCoach domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error variant.

use thiserror::Error;

/// The top-level error type for StreamCoach operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Signal source errors ---
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    // --- Notification errors ---
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source not configured: {0}")]
    NotConfigured(String),

    #[error("Source connection lost: {0}")]
    ConnectionLost(String),

    #[error("Malformed event from {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification backend unavailable: {0}")]
    Unavailable(String),

    #[error("Delivery of '{action}' reminder failed: {reason}")]
    DeliveryFailed { action: String, reason: String },
}
