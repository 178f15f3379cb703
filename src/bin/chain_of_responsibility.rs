// Chain of Responsibility demo: hand food to a chain of animals.
//
// Run with: cargo run --bin chain_of_responsibility [demos.toml]

use colored::Colorize;
use design_patterns::behavioral::chain::{
    describe, serve, DogHandler, Handler, MonkeyHandler, SquirrelHandler,
};
use design_patterns::config::DemoConfig;
use design_patterns::telemetry::init_tracing;
use design_patterns::Result;
use std::process::ExitCode;

fn client_code(head: &dyn Handler, requests: &[String]) {
    for delivery in serve(head, requests) {
        println!("Client: Who wants a {}?", delivery.request);
        match delivery.result {
            Some(result) => println!("  {}", result.green()),
            None => println!("  {}", format!("{} was left untouched.", delivery.request).dimmed()),
        }
    }
}

fn run() -> Result<()> {
    let config = DemoConfig::from_args()?;

    let mut monkey = MonkeyHandler::new();
    monkey
        .set_next(Box::new(SquirrelHandler::new()))
        .set_next(Box::new(DogHandler::new()));

    println!("{}\n", format!("=== Chain: {} ===", describe(&monkey)).bold());
    client_code(&monkey, &config.chain.requests);

    // The squirrel is owned by the monkey; borrow it to start mid-chain.
    if let Some(squirrel) = monkey.next() {
        println!("\n{}\n", format!("=== Subchain: {} ===", describe(squirrel)).bold());
        client_code(squirrel, &config.chain.requests);
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
