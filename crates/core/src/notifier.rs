//! Notifier trait — the delivery end of the scheduler.
//!
//! A Notifier takes a [`Reminder`] the context engine has approved and puts
//! it in front of the streamer (terminal banner, desktop toast, overlay…).
//! Delivery failures stay inside the notifier's error; the scheduler logs
//! them and never retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NotifyError;

/// A reminder that is ready to be shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique delivery ID
    pub id: Uuid,

    /// Timer/action name (e.g., "break", "hydration")
    pub action: String,

    /// Short headline (e.g., "Hydration Check")
    pub title: String,

    /// Body text
    pub message: String,

    /// Why the context engine let it through
    pub reason: String,

    /// When the scheduler released it
    pub at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(
        action: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            title: title.into(),
            message: message.into(),
            reason: reason.into(),
            at,
        }
    }
}

/// The core Notifier trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable backend name (e.g., "console").
    fn name(&self) -> &str;

    /// Deliver a reminder.
    async fn notify(&self, reminder: &Reminder) -> std::result::Result<(), NotifyError>;
}
