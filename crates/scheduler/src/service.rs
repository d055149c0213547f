//! The coach service — single owner of all mutable scheduling state.
//!
//! Sources never touch the aggregator or the timers directly. They push
//! [`SignalEvent`]s into one queue; the service drains it, ticks the
//! scheduler on an interval and stops when the shutdown flag flips or every
//! source has gone away.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use streamcoach_config::AppConfig;
use streamcoach_context::{ContextEngine, ContextSettings, KeywordMatcher, SignalAggregator, SignalState};
use streamcoach_core::{ChatCommand, CoachEvent, EventBus, Notifier, SignalEvent, SourceError};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::scheduler::{Scheduler, TickReport};
use crate::timers::TimerRegistry;

/// The scheduling actor.
pub struct CoachService {
    aggregator: SignalAggregator,
    matcher: KeywordMatcher,
    scheduler: Scheduler,
    bus: Arc<EventBus>,
    streamer: Option<String>,
    default_snooze: Duration,
    tick_every: std::time::Duration,
    show_chat: bool,
}

impl CoachService {
    /// Build the service from validated config. Timers count from `now`.
    pub fn new(
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
        bus: Arc<EventBus>,
        now: DateTime<Utc>,
    ) -> Self {
        let settings = ContextSettings::from(&config.context);
        let engine = ContextEngine::new(&settings);
        let timers = TimerRegistry::from_config(&config.timers, now);

        Self {
            aggregator: SignalAggregator::new(settings.velocity_window, now),
            matcher: KeywordMatcher::new(&config.context.keywords),
            scheduler: Scheduler::new(engine, timers, notifier),
            bus,
            streamer: config.streamer.clone(),
            default_snooze: settings.snooze_cooldown,
            tick_every: std::time::Duration::from_secs(config.scheduler.tick_seconds.max(1)),
            show_chat: config.logging.show_chat,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn timers(&self) -> &TimerRegistry {
        self.scheduler.timers()
    }

    /// Current signal state without ticking.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> SignalState {
        self.aggregator.snapshot(now)
    }

    fn is_streamer(&self, sender: &str, from_streamer: bool) -> bool {
        from_streamer
            || self
                .streamer
                .as_deref()
                .is_some_and(|owner| owner.eq_ignore_ascii_case(sender))
    }

    /// Apply one signal event.
    ///
    /// Chat from the channel owner that parses as a command is turned into
    /// the matching control event and is not counted as chat traffic.
    pub fn handle_event(&mut self, event: SignalEvent) {
        if let SignalEvent::Chat {
            timestamp,
            sender,
            text,
            from_streamer,
        } = &event
        {
            if self.is_streamer(sender, *from_streamer) {
                if let Some(command) = ChatCommand::parse(text) {
                    debug!(?command, "Streamer command");
                    let control = command.into_event(*timestamp, self.default_snooze);
                    self.apply(control);
                    return;
                }
            }
            if self.show_chat {
                info!(sender = %sender, "{text}");
            }
        }

        self.apply(event);
    }

    fn apply(&mut self, event: SignalEvent) {
        let kind = event.kind();
        let seen_at = event.timestamp().unwrap_or_else(Utc::now);

        match &event {
            SignalEvent::ResetTimer { action, timestamp } => {
                if self.scheduler.timers_mut().reset(action, *timestamp) {
                    self.bus.publish(CoachEvent::TimerReset {
                        action: action.clone(),
                        timestamp: *timestamp,
                    });
                } else {
                    warn!(action = %action, "Reset for unknown timer ignored");
                }
            }
            SignalEvent::Snooze { action, until } => {
                info!(action = %action, until = %until, "Snoozed");
                self.aggregator.ingest(&event, &self.matcher);
            }
            SignalEvent::ClearSnooze { action } => {
                info!(action = %action, "Snooze cleared");
                self.aggregator.ingest(&event, &self.matcher);
            }
            SignalEvent::Chat { .. } | SignalEvent::Voice { .. } => {
                if let Some(keyword) = self.aggregator.ingest(&event, &self.matcher) {
                    debug!(keyword = %keyword, "Keyword spotted");
                    self.bus.publish(CoachEvent::KeywordSpotted {
                        keyword,
                        timestamp: seen_at,
                    });
                }
            }
        }

        self.bus.publish(CoachEvent::SignalRecorded {
            kind: kind.to_string(),
            timestamp: seen_at,
        });
    }

    /// Run one scheduling pass at `now` and publish its outcome.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let state = self.aggregator.snapshot(now);
        let report = self.scheduler.tick(&state, now).await;

        for decision in &report.delivered {
            match &decision.error {
                None => self.bus.publish(CoachEvent::ReminderDelivered {
                    action: decision.action.clone(),
                    reason: decision.verdict.reason().to_string(),
                    timestamp: now,
                }),
                Some(e) => self.bus.publish(CoachEvent::DeliveryFailed {
                    action: decision.action.clone(),
                    error_message: e.to_string(),
                    timestamp: now,
                }),
            }
        }
        for decision in &report.deferred {
            self.bus.publish(CoachEvent::ReminderDeferred {
                action: decision.action.clone(),
                reason: decision.verdict.reason().to_string(),
                timestamp: now,
            });
        }

        report
    }

    /// Drive the service until shutdown or until every source has closed.
    ///
    /// Returns the service so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<Result<SignalEvent, SourceError>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Self {
        let mut ticker = tokio::time::interval(self.tick_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            timers = self.timers().len(),
            tick_seconds = self.tick_every.as_secs(),
            "Coach service started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }
                received = events.recv() => match received {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => warn!(error = %e, "Signal source error"),
                    None => {
                        info!("All signal sources closed");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    let report = self.tick_at(Utc::now()).await;
                    if !report.is_idle() {
                        debug!(
                            delivered = report.delivered.len(),
                            deferred = report.deferred.len(),
                            "Tick complete"
                        );
                    }
                }
            }
        }

        self
    }
}
