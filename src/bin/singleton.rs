// Singleton demo: two threads race to create the shared settings.
//
// Run with: cargo run --bin singleton [demos.toml]

use colored::Colorize;
use design_patterns::config::DemoConfig;
use design_patterns::creational::singleton::{all_agree, race, Settings, SingletonRegistry};
use design_patterns::telemetry::init_tracing;
use design_patterns::Result;
use std::process::ExitCode;

fn run() -> Result<()> {
    let config = DemoConfig::from_args()?;
    let registry = SingletonRegistry::global();

    println!("If you see the same value, then singleton was reused (yay!)");
    println!("If you see different values, then 2 singletons were created (booo!!)\n");
    println!("{}\n", "RESULT:".bold());

    let sightings = race(registry, &config.singleton.values)?;
    for sighting in &sightings {
        println!(
            "  [{}] asked for {:?}, singleton value: {}",
            sighting.thread,
            sighting.requested,
            sighting.observed.cyan()
        );
    }

    if let Some(settings) = registry.get::<Settings>() {
        println!("\n  {}", settings.some_business_logic());
    }

    if all_agree(&sightings) {
        println!("\n{}", "One instance shared by every thread".green());
    } else {
        println!("\n{}", "Threads observed different instances".red());
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
