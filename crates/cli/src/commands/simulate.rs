//! `streamcoach simulate` — Replay a script in virtual time.
//!
//! Nothing sleeps: the clock jumps from tick to tick, applying every script
//! event that happened in between. Each decision is printed with its offset
//! from the start of the script.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use streamcoach_channels::{ConsoleNotifier, Script};
use streamcoach_config::AppConfig;
use streamcoach_core::{EventBus, Notifier};
use streamcoach_scheduler::{CoachService, TickReport};

use super::load_config;

/// Summary of a finished simulation.
#[derive(Debug, Default)]
pub struct SimulationSummary {
    pub ticks: usize,
    pub events: usize,
    /// Delivered reminders, in order, as `(offset_seconds, action, reason)`
    pub delivered: Vec<(i64, String, String)>,
    /// Deferrals per reason
    pub deferrals: HashMap<String, usize>,
}

pub async fn run(config_path: Option<&Path>, file: &Path, tick: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let script = Script::load(file)?;

    if let Some(secs) = tick {
        config.scheduler.tick_seconds = secs;
    }
    if !script.timers.is_empty() {
        config.timers = script.timers.clone();
    }
    config.validate()?;

    let title = script.name.as_deref().unwrap_or("script");
    println!("🎬 Simulating \"{title}\" ({}s, tick {}s)", script.duration_seconds(), config.scheduler.tick_seconds);
    println!("==========================================\n");

    let notifier = Arc::new(ConsoleNotifier::new(&config.notifications));
    let summary = simulate(&config, &script, notifier, Utc::now(), true).await;

    println!("\n📊 Summary");
    println!("  Ticks:     {}", summary.ticks);
    println!("  Events:    {}", summary.events);
    println!("  Delivered: {}", summary.delivered.len());
    let mut reasons: Vec<_> = summary.deferrals.iter().collect();
    reasons.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (reason, count) in reasons {
        println!("  Held {count:>4}× {reason}");
    }

    Ok(())
}

/// Drive a fresh service through `script` starting at `start`.
pub async fn simulate(
    config: &AppConfig,
    script: &Script,
    notifier: Arc<dyn Notifier>,
    start: DateTime<Utc>,
    verbose: bool,
) -> SimulationSummary {
    let streamer = config.streamer.clone().unwrap_or_else(|| "streamer".into());
    let bus = Arc::new(EventBus::default());
    let mut service = CoachService::new(config, notifier, bus, start);
    let mut summary = SimulationSummary::default();

    let timeline = script.timeline(start, &streamer);
    let mut pending = timeline.into_iter().peekable();
    let step = seconds(config.scheduler.tick_seconds.max(1));
    let end = start
        .checked_add_signed(seconds(script.duration_seconds()))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut held: HashMap<String, String> = HashMap::new();
    let mut now = start;
    while now <= end {
        while let Some((_, event)) = pending.next_if(|(at, _)| *at <= now) {
            summary.events += 1;
            service.handle_event(event);
        }

        let report = service.tick_at(now).await;
        summary.ticks += 1;
        record(&mut summary, &mut held, &report, start, verbose);

        match now.checked_add_signed(step) {
            Some(next) => now = next,
            None => break,
        }
    }

    summary
}

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn record(
    summary: &mut SimulationSummary,
    held: &mut HashMap<String, String>,
    report: &TickReport,
    start: DateTime<Utc>,
    verbose: bool,
) {
    let offset = (report.at - start).num_seconds();
    let clock = format!("{:02}:{:02}", offset / 60, offset % 60);

    for decision in &report.deferred {
        let reason = decision.verdict.reason().to_string();
        *summary.deferrals.entry(reason.clone()).or_default() += 1;
        if held.get(&decision.action) != Some(&reason) {
            if verbose {
                println!("[{clock}] ⏸️  {} held: {reason}", decision.action);
            }
            held.insert(decision.action.clone(), reason);
        }
    }

    for decision in &report.delivered {
        held.remove(&decision.action);
        let reason = decision.verdict.reason().to_string();
        if verbose {
            println!("[{clock}] ✅ {} delivered: {reason}", decision.action);
        }
        summary.delivered.push((offset, decision.action.clone(), reason));
    }
}
