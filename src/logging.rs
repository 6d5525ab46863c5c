//! Logging setup for the binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a `tracing` subscriber printing to stderr. The filter comes from
/// `RUST_LOG` and defaults to `info`. Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
