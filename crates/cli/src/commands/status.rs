//! `streamcoach status` — Show timers and context settings.

use std::path::Path;

use chrono::Utc;
use streamcoach_context::{ContextEngine, ContextSettings, RuleKind};
use streamcoach_scheduler::TimerRegistry;

use super::{config_file, human_duration, load_config};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let settings = ContextSettings::from(&config.context);
    let engine = ContextEngine::new(&settings);
    let timers = TimerRegistry::from_config(&config.timers, Utc::now());

    println!("🎙️  StreamCoach Status");
    println!("=====================");
    println!("  Config:       {}", config_file(config_path).display());
    println!("  Streamer:     {}", config.streamer.as_deref().unwrap_or("(not set)"));
    println!("  Tick:         every {}s", config.scheduler.tick_seconds);
    println!(
        "  Wait quiet:   {}",
        if settings.wait_for_quiet { "yes" } else { "no — reminders fire as soon as due" }
    );

    println!("\n  Timers:");
    if timers.is_empty() {
        println!("    (none configured)");
    }
    for timer in timers.iter() {
        if timer.is_enabled() {
            println!("    ⏱️  {:<10} every {:<8} {}", timer.action, human_duration(timer.interval), timer.title);
        } else {
            println!("    ⏹️  {:<10} disabled", timer.action);
        }
    }

    println!("\n  Context:");
    println!(
        "    Chat velocity   hype ≥ {}/min · quiet ≤ {}/min over {}",
        settings.high_velocity_threshold,
        settings.low_velocity_threshold,
        human_duration(settings.velocity_window)
    );
    println!(
        "    Keywords        {} ({})",
        config.context.keywords.join(", "),
        if settings.block_on_keywords {
            format!("block for {}", human_duration(settings.keyword_lookback))
        } else {
            "not blocking".to_string()
        }
    );
    println!("    Natural pause   {} of silence", human_duration(settings.silence_window));
    println!("    Default snooze  {}", human_duration(settings.snooze_cooldown));

    let order: Vec<String> = engine
        .rules()
        .iter()
        .map(|rule| match rule.kind() {
            RuleKind::Blocker => format!("⛔ {rule}"),
            RuleKind::Enabler => format!("✅ {rule}"),
        })
        .collect();
    println!("    Rule order      {}", order.join(" → "));

    if !config_file(config_path).exists() {
        println!("\n  ⚠️  No config file — run `streamcoach onboard` first");
    }

    Ok(())
}
