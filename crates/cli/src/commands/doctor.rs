//! `streamcoach doctor` — Diagnose configuration problems.

use std::path::Path;

use streamcoach_config::AppConfig;

use super::{config_file, load_config};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 StreamCoach Doctor — Diagnostics");
    println!("===================================\n");

    let path = config_file(config_path);
    let mut issues = 0;

    if path.exists() {
        match load_config(config_path) {
            Ok(config) => {
                println!("  ✅ Config file valid");
                issues += check(&config);
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  No config file at {} — defaults in use", path.display());
        println!("     Run `streamcoach onboard` to create one");
        issues += 1;
        issues += check(&AppConfig::default());
    }

    let demo = path.with_file_name("demo.toml");
    if demo.exists() {
        println!("  ✅ Demo script present: {}", demo.display());
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Soft checks on a config that already passed validation.
fn check(config: &AppConfig) -> usize {
    let mut issues = 0;

    if config.streamer.is_some() {
        println!("  ✅ Streamer set — chat commands enabled");
    } else {
        println!("  ⚠️  No streamer set — `!snooze` in chat won't be recognised");
        issues += 1;
    }

    let active = config.active_timers().count();
    if active == 0 {
        println!("  ⚠️  Every timer is disabled — nothing will ever be reminded");
        issues += 1;
    } else {
        println!("  ✅ {active} active timer(s)");
    }

    if !config.context.wait_for_quiet {
        println!("  ⚠️  wait_for_quiet = false — reminders ignore chat and voice");
        issues += 1;
    }

    let ctx = &config.context;
    if ctx.low_velocity_threshold == ctx.high_velocity_threshold {
        println!("  ⚠️  Quiet and hype thresholds are equal — chat is never \"in between\"");
        issues += 1;
    }

    if config.scheduler.tick_seconds > ctx.silence_window_seconds {
        println!(
            "  ⚠️  Tick ({}s) is longer than the silence window ({}s) — short pauses will be missed",
            config.scheduler.tick_seconds, ctx.silence_window_seconds
        );
        issues += 1;
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_only_misses_streamer() {
        assert_eq!(check(&AppConfig::default()), 1);
    }

    #[test]
    fn flags_disabled_timers_and_bypass() {
        let mut config = AppConfig {
            streamer: Some("nightowl".into()),
            ..AppConfig::default()
        };
        for timer in &mut config.timers {
            timer.interval_minutes = 0;
        }
        config.context.wait_for_quiet = false;
        assert_eq!(check(&config), 2);
    }
}
