//! Tracing setup shared by the demo binaries.
//!
//! Events go to stderr so stdout only carries the demo narrative.
//! Set `RUST_LOG=debug` to watch dispatch, cache hits and construction.

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter())
        .try_init();

    if installed.is_ok() {
        tracing::debug!(default = DEFAULT_FILTER, "Tracing initialized");
    }
}
