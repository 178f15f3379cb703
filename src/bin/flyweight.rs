// Flyweight demo: a police database sharing car models between records.
//
// Run with: cargo run --bin flyweight [demos.toml]

use colored::Colorize;
use design_patterns::config::DemoConfig;
use design_patterns::structural::flyweight::{
    add_car_to_police_database, CacheOutcome, CarModel, FlyweightFactory,
};
use design_patterns::telemetry::init_tracing;
use design_patterns::Result;
use std::process::ExitCode;

fn run() -> Result<()> {
    let config = DemoConfig::from_args()?;

    let mut factory = FlyweightFactory::new(config.flyweight.seed.iter().map(CarModel::intrinsic));
    println!("{}", factory.listing());

    for car in &config.flyweight.cars {
        println!("\n{}", "Client: Adding a car to database.".bold());
        let registered = add_car_to_police_database(&mut factory, car)?;
        match registered.outcome {
            CacheOutcome::Hit => println!("{}", "FlyweightFactory: Reusing existing flyweight.".green()),
            CacheOutcome::Miss => println!(
                "{}",
                "FlyweightFactory: Can't find a flyweight, creating new one.".yellow()
            ),
        }
        println!("{}", registered.description);
    }

    println!("\n{}", factory.listing());

    let stats = factory.stats();
    println!("\n(hits: {}, misses: {})", stats.hits, stats.misses);

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
