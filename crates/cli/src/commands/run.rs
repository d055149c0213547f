//! `streamcoach run` — Watch the stream and deliver reminders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use streamcoach_channels::{ConsoleNotifier, ConsoleSource, Script, ScriptSource, SourceRegistry};
use streamcoach_core::{CoachEvent, EventBus};
use streamcoach_scheduler::CoachService;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{human_duration, load_config};

pub async fn run(config_path: Option<&Path>, script: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let streamer = config.streamer.clone().unwrap_or_else(|| "streamer".into());

    let mut sources = SourceRegistry::new();
    match &script {
        Some(path) => {
            let script = Script::load(path)?;
            if !script.timers.is_empty() {
                warn!("Script timers are only used by `simulate`; using configured timers");
            }
            sources.register(Arc::new(ScriptSource::new(script, streamer.clone())));
        }
        None => sources.register(Arc::new(ConsoleSource::new())),
    }

    let bus = Arc::new(EventBus::default());
    let notifier = Arc::new(ConsoleNotifier::new(&config.notifications));
    let service = CoachService::new(&config, notifier, bus.clone(), Utc::now());

    println!("🎙️  StreamCoach");
    println!("==============");
    println!("  Streamer: {streamer}");
    for timer in service.timers().iter().filter(|t| t.is_enabled()) {
        println!("  ⏱️  {:<10} every {}", timer.action, human_duration(timer.interval));
    }
    if script.is_none() {
        println!("\n  Type chat lines (`name: message`), or commands:");
        println!("  /voice on|off · /snooze <action|all> [min] · /unsnooze <action|all> · /reset <action>");
        println!("  Ctrl+D or `exit` to stop.\n");
    }

    if config.logging.show_timers {
        tokio::spawn(print_events(bus.subscribe()));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let events = sources.start_all().await?;
    let service = service.run(events, shutdown_rx).await;
    sources.stop_all().await;

    let now = Utc::now();
    println!("\n👋 Shutting down. Take care of yourself!");
    for timer in service.timers().iter().filter(|t| t.is_enabled()) {
        match timer.last_fired {
            Some(at) => println!("  {:<10} last reminded {} ago", timer.action, human_duration(now - at)),
            None => println!("  {:<10} not reminded this session", timer.action),
        }
    }
    info!("Coach stopped");

    Ok(())
}

/// Echo service events; a deferral is only printed when its reason changes.
async fn print_events(mut rx: broadcast::Receiver<Arc<CoachEvent>>) {
    let mut held: HashMap<String, String> = HashMap::new();

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Event printer lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match &*event {
            CoachEvent::ReminderDeferred { action, reason, .. } => {
                if held.get(action) != Some(reason) {
                    println!("  ⏸️  {action} is due, holding: {reason}");
                    held.insert(action.clone(), reason.clone());
                }
            }
            CoachEvent::ReminderDelivered { action, .. } => {
                held.remove(action);
            }
            CoachEvent::DeliveryFailed { action, error_message, .. } => {
                held.remove(action);
                println!("  ❌ {action} reminder failed: {error_message}");
            }
            CoachEvent::TimerReset { action, .. } => {
                println!("  🔄 Timer reset: {action}");
            }
            CoachEvent::KeywordSpotted { keyword, .. } => {
                println!("  🔥 Intense moment: \"{keyword}\"");
            }
            CoachEvent::SignalRecorded { .. } => {}
        }
    }
}
