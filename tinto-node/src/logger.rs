//! Global `tracing` logger setup, grounded on the teacher's `logger` crate:
//! a single compact stdout layer driven by `RUST_LOG`, defaulting to INFO.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Initialize the global logger. Panics if a logger is already set.
pub fn init() {
    try_init().expect("failed to set up logger");
}

/// Try to initialize the global logger, returning `Err` if one is already
/// set rather than panicking — used by tests, where multiple test threads
/// race to install the subscriber.
pub fn try_init() -> Result<(), TryInitError> {
    let rust_log_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|rust_log| Targets::from_str(&rust_log).ok())
        .unwrap_or_else(|| Targets::new().with_default(Level::INFO));

    let stdout_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_level(true)
        .with_target(true)
        .with_filter(rust_log_filter);

    tracing_subscriber::registry().with(stdout_log).try_init()
}

/// Initialize the logger in tests, a no-op unless `RUST_LOG` is set.
pub fn init_for_testing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let _ = try_init();
}
