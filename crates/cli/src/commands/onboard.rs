//! `streamcoach onboard` — First-time setup.

use std::path::Path;

use streamcoach_config::AppConfig;

use super::config_file;

/// Written next to the config so `simulate` works out of the box.
const DEMO_SCRIPT: &str = r#"# A ten-minute stream in fast-forward: run `streamcoach simulate demo.toml`
name = "demo"
duration_seconds = 600

[[timers]]
name = "hydration"
interval_minutes = 2

[[timers]]
name = "posture"
interval_minutes = 4

# Raid arrives, chat explodes
[[events]]
at = 60
type = "chat"
sender = "raider"
text = "RAID HYPE"
repeat = 40
every = 1

# Streamer talks it through
[[events]]
at = 110
type = "voice"
active = true

[[events]]
at = 200
type = "voice"
active = false

[[events]]
at = 300
type = "command"
text = "!snooze posture 3"

[[events]]
at = 420
type = "chat"
sender = "regular"
text = "this boss fight is amazing"
"#;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_file(config_path);
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_dir);

    println!("🎙️  StreamCoach — First-Time Setup");
    println!("==================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    let demo_path = config_dir.join("demo.toml");
    if !demo_path.exists() {
        std::fs::write(&demo_path, DEMO_SCRIPT)?;
        println!("✅ Created demo script: {}", demo_path.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set `streamer = \"<your channel name>\"` in {}", config_path.display());
        println!("   2. Try it: streamcoach simulate {}", demo_path.display());
        println!("   3. Go live: streamcoach run\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
