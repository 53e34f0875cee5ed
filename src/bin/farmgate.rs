//! Routing dry-run for the default backend pool.
//!
//! Usage:
//!
//! ```text
//! farmgate '{"browserName":"chrome","platformName":"LINUX"}'
//! farmgate --list
//! ```
//!
//! The pool is built from `FARMGATE_*` environment variables. Given a
//! capability document, the command prints the backend that would serve it
//! and exits with status 2 when none can. `--list` prints every backend in
//! selection order.

use clap::Parser;
use farmgate::backend::domain::{BackendDomainError, CapabilitySet, SessionLifecycleError};
use farmgate::backend::services::{BackendOrderingPolicy, default_pool};
use farmgate::config::{ConfigError, GatewayConfig, ProcessEnvironment};
use farmgate::telemetry::{self, TelemetryError};
use mockable::DefaultClock;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const NO_BACKEND: u8 = 2;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "farmgate",
    version,
    about = "Shows which backend would serve a capability request"
)]
struct Args {
    /// Requested capabilities as a JSON object.
    #[arg(required_unless_present = "list")]
    capabilities: Option<String>,

    /// Print every backend in selection order and exit.
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid backend configuration: {0}")]
    Backend(#[from] BackendDomainError),
    #[error("capabilities must be a JSON object: {0}")]
    Capabilities(#[source] serde_json::Error),
    #[error(transparent)]
    Lifecycle(#[from] SessionLifecycleError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> Result<ExitCode, CliError> {
    let args = Args::parse();
    telemetry::init()?;
    run(&args)
}

fn run(args: &Args) -> Result<ExitCode, CliError> {
    let config = GatewayConfig::from_environment(&ProcessEnvironment)?;
    debug!(?config, "configuration loaded");
    let pool = default_pool(&config, Arc::new(DefaultClock))?;
    let mut stdout = io::stdout().lock();

    if args.list {
        for backend in BackendOrderingPolicy.order(&pool) {
            writeln!(
                stdout,
                "{}\t{}\t{}\t{}",
                backend.rank(),
                backend.name(),
                backend.display_name(),
                backend.profile().hub_url()
            )?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let raw = args.capabilities.as_deref().unwrap_or("{}");
    let requested: CapabilitySet = serde_json::from_str(raw).map_err(CliError::Capabilities)?;
    let Some((backend, session)) = BackendOrderingPolicy.select(&pool, &requested) else {
        writeln!(stdout, "no backend can serve the requested capabilities")?;
        return Ok(ExitCode::from(NO_BACKEND));
    };

    writeln!(
        stdout,
        "{} ({}) at {}",
        backend.display_name(),
        backend.kind(),
        backend.profile().hub_url()
    )?;
    backend.release(&session)?;
    Ok(ExitCode::SUCCESS)
}
