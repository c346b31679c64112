use anyhow::Result;
use chrono::Local;

use covidash_core::clock;
use covidash_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    if config.updates.is_empty() {
        println!("No updates configured.");
        println!("\nAdd [[updates]] entries to {}:", AppConfig::config_path().display());
        println!("  name = \"morning covid\"");
        println!("  time = \"08:00\"");
        println!("  feed = \"health\"");
        println!("  repeat = true");
        return Ok(());
    }

    println!("Configured updates ({}):\n", config.updates.len());

    let now = Local::now();
    for update in &config.updates {
        let cadence = if update.repeat { "daily" } else { "once" };
        match clock::next_occurrence(&update.time, &now) {
            Ok(fire_at) => println!(
                "  {} - {:?} at {} ({}), next: {}",
                update.name,
                update.feed,
                update.time,
                cadence,
                fire_at.format("%Y-%m-%d %H:%M")
            ),
            Err(e) => println!("  {} - INVALID: {}", update.name, e),
        }
    }

    Ok(())
}
