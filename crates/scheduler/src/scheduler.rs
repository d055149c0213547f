//! The scheduler tick: due timers × context verdict → delivered reminders.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use streamcoach_context::{ContextEngine, SignalState, Verdict};
use streamcoach_core::{Notifier, NotifyError, Reminder};
use tracing::{debug, info, warn};

use crate::timers::TimerRegistry;

/// What happened to one due timer during a tick.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: String,
    pub verdict: Verdict,
    /// Set when the notifier rejected an admitted reminder
    pub error: Option<NotifyError>,
}

/// Everything one tick did.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    /// Admitted reminders, including ones the notifier failed to show
    pub delivered: Vec<Decision>,
    /// Due reminders held back by the context engine
    pub deferred: Vec<Decision>,
}

impl TickReport {
    fn new(at: DateTime<Utc>) -> Self {
        Self {
            at,
            delivered: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Nothing was due.
    pub fn is_idle(&self) -> bool {
        self.delivered.is_empty() && self.deferred.is_empty()
    }
}

/// Owns the timers and asks the context engine before every delivery.
pub struct Scheduler {
    engine: ContextEngine,
    timers: TimerRegistry,
    notifier: Arc<dyn Notifier>,
}

impl Scheduler {
    pub fn new(engine: ContextEngine, timers: TimerRegistry, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            engine,
            timers,
            notifier,
        }
    }

    pub fn engine(&self) -> &ContextEngine {
        &self.engine
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerRegistry {
        &mut self.timers
    }

    /// Run one scheduling pass.
    ///
    /// Due timers are visited in registration order. An admitted timer is
    /// handed to the notifier and marked fired, even if delivery fails.
    /// A denied timer stays due and is looked at again next tick.
    pub async fn tick(&mut self, state: &SignalState, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::new(now);

        let due: Vec<Reminder> = self
            .timers
            .due(now)
            .into_iter()
            .map(|timer| Reminder::new(&timer.action, &timer.title, &timer.message, "", now))
            .collect();

        if due.is_empty() {
            debug!("No timers due");
            return report;
        }

        for mut reminder in due {
            let verdict = self.engine.is_good_time_for(&reminder.action, state, now);

            if !verdict.is_admitted() {
                debug!(action = %reminder.action, reason = %verdict.reason(), "Reminder deferred");
                report.deferred.push(Decision {
                    action: reminder.action,
                    verdict,
                    error: None,
                });
                continue;
            }

            reminder.reason = verdict.reason().to_string();
            let error = match self.notifier.notify(&reminder).await {
                Ok(()) => {
                    info!(
                        action = %reminder.action,
                        reason = %verdict.reason(),
                        notifier = self.notifier.name(),
                        "Reminder delivered"
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        action = %reminder.action,
                        notifier = self.notifier.name(),
                        error = %e,
                        "Notifier failed, not retrying"
                    );
                    Some(e)
                }
            };

            self.timers.mark_fired(&reminder.action, now);
            report.delivered.push(Decision {
                action: reminder.action,
                verdict,
                error,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;
    use streamcoach_context::ContextSettings;

    /// Records every reminder; optionally fails each delivery.
    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Reminder>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn notify(&self, reminder: &Reminder) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(reminder.clone());
            if self.fail {
                return Err(NotifyError::Unavailable("display offline".into()));
            }
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn quiet(now: DateTime<Utc>) -> SignalState {
        let mut state = SignalState::at(now);
        state.voice_changed_at = now - Duration::minutes(10);
        state
    }

    fn hype(now: DateTime<Utc>) -> SignalState {
        let mut state = SignalState::at(now);
        state.chat_velocity = 40.0;
        state
    }

    fn scheduler(notifier: Arc<RecordingNotifier>) -> Scheduler {
        let mut timers = TimerRegistry::new();
        timers.register("hydration", Duration::minutes(45), t0());
        timers.register("break", Duration::minutes(120), t0());
        Scheduler::new(ContextEngine::new(&ContextSettings::default()), timers, notifier)
    }

    #[tokio::test]
    async fn admitted_reminder_is_delivered_and_marked() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(notifier.clone());
        let now = t0() + Duration::minutes(45);

        let report = scheduler.tick(&quiet(now), now).await;

        assert_eq!(report.delivered.len(), 1);
        assert_eq!(report.delivered[0].action, "hydration");
        assert_eq!(report.delivered[0].verdict.reason(), "chat is quiet");

        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "Hydration Check");
        assert_eq!(seen[0].reason, "chat is quiet");
        drop(seen);

        assert!(!scheduler.timers().is_due("hydration", now));
    }

    #[tokio::test]
    async fn denied_reminder_stays_due() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(notifier.clone());
        let now = t0() + Duration::minutes(50);

        let report = scheduler.tick(&hype(now), now).await;
        assert!(report.delivered.is_empty());
        assert_eq!(report.deferred.len(), 1);
        assert_eq!(report.deferred[0].verdict.reason(), "chat is popping off");
        assert!(scheduler.timers().is_due("hydration", now));
        assert!(notifier.seen.lock().unwrap().is_empty());

        // Next tick chat has calmed down
        let later = now + Duration::seconds(10);
        let report = scheduler.tick(&quiet(later), later).await;
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(notifier.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_still_marks_fired() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let mut scheduler = scheduler(notifier.clone());
        let now = t0() + Duration::minutes(45);

        let report = scheduler.tick(&quiet(now), now).await;
        assert_eq!(report.delivered.len(), 1);
        assert!(report.delivered[0].error.is_some());
        assert!(!scheduler.timers().is_due("hydration", now));

        // Not retried on the next tick
        let later = now + Duration::seconds(10);
        assert!(scheduler.tick(&quiet(later), later).await.is_idle());
        assert_eq!(notifier.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn due_timers_visited_in_registration_order() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(notifier.clone());
        let now = t0() + Duration::minutes(121);

        let report = scheduler.tick(&quiet(now), now).await;
        let actions: Vec<&str> = report.delivered.iter().map(|d| d.action.as_str()).collect();
        assert_eq!(actions, ["hydration", "break"]);
    }

    #[tokio::test]
    async fn idle_tick_when_nothing_due() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(notifier);
        let now = t0() + Duration::minutes(5);
        assert!(scheduler.tick(&quiet(now), now).await.is_idle());
    }
}
