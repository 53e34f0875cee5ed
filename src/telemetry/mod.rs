//! Tracing subscriber setup.
//!
//! The log level is read from `RUST_LOG`, for example
//! `RUST_LOG=farmgate=debug`; without it only `farmgate` events at `info`
//! and above are shown. Output goes to stderr.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "farmgate=info";

/// Error returned when the global subscriber cannot be installed.
#[derive(Debug, Error)]
#[error("failed to initialise tracing: {0}")]
pub struct TelemetryError(#[from] tracing_subscriber::util::TryInitError);

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber is already installed.
pub fn init() -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()?;
    Ok(())
}
