//! Coach event system — observable outcomes of the scheduler.
//!
//! The service publishes an event whenever something interesting happens
//! (a reminder goes out, a due reminder is held back, a signal is applied).
//! Front-ends subscribe to render a timeline without coupling to the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All coach events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CoachEvent {
    /// A reminder was handed to the notifier.
    ReminderDelivered {
        action: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A due reminder was held back by the context engine.
    ReminderDeferred {
        action: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A signal event was applied to the aggregator.
    SignalRecorded {
        kind: String,
        timestamp: DateTime<Utc>,
    },

    /// A keyword was spotted in chat.
    KeywordSpotted {
        keyword: String,
        timestamp: DateTime<Utc>,
    },

    /// A timer was restarted by hand.
    TimerReset {
        action: String,
        timestamp: DateTime<Utc>,
    },

    /// The notifier rejected a reminder.
    DeliveryFailed {
        action: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for coach events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Slow subscribers lag and lose the oldest events; the publisher never blocks.
pub struct EventBus {
    sender: broadcast::Sender<Arc<CoachEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: CoachEvent) {
        // No subscribers is fine
        if self.sender.send(Arc::new(event)).is_err() {
            tracing::trace!("Coach event dropped, no subscribers");
        }
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CoachEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(CoachEvent::ReminderDelivered {
            action: "hydration".into(),
            reason: "chat is quiet".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            CoachEvent::ReminderDelivered { action, reason, .. } => {
                assert_eq!(action, "hydration");
                assert_eq!(reason, "chat is quiet");
            }
            _ => panic!("Expected ReminderDelivered event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(CoachEvent::DeliveryFailed {
            action: "break".into(),
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
