//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "MCFORECAST_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. Reads per-target levels from `MCFORECAST_LOG`
/// (e.g. `MCFORECAST_LOG=mcforecast=debug`), falling back to `mcforecast=info`.
/// Output goes to stderr so JSON on stdout stays machine-readable. Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("mcforecast=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
