use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::{fmt, EnvFilter};

use llm_console::cli::{self, Cli};

/// Default filter keeps log lines out of the console output.
const DEFAULT_LOG_FILTER: &str = "warn";

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| eyre!("failed to init tracing: {err}"))
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    // One cooperative thread: stream delivery and commands interleave only
    // at await points.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(cli::run(cli))
}
