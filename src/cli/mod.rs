//! Command-line entry points.
//!
//! [`run`] resolves the configuration (flags, then environment, then
//! defaults) and either executes one subcommand or starts the interactive
//! console.
//!
//! ```ignore
//! use clap::Parser;
//! use llm_console::cli::{self, Cli};
//!
//! let code = runtime.block_on(cli::run(Cli::parse()))?;
//! ```

pub mod args;

pub use args::{Cli, Commands};

use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::Result;

use crate::backend::BackendClient;
use crate::config::ClientConfig;
use crate::console::{repl, Command, Console, Flow, RenderSink, StdoutSink};
use crate::session::SessionOutcome;

/// Run the console as described by `cli`.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.config(ClientConfig::from_env()?)?;
    tracing::debug!(base_url = %config.base_url, top_k = config.default_top_k, "configuration loaded");

    let client = BackendClient::new(&config);
    let output: Arc<dyn RenderSink> = Arc::new(StdoutSink::new());
    let mut console = Console::new(&config, client, output);

    match cli.command {
        Some(command) => Ok(run_once(&mut console, command.into()).await),
        None => {
            repl::run(&mut console).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Execute a single command, waiting for a stream to end if it started one.
async fn run_once(console: &mut Console, command: Command) -> ExitCode {
    let flow = console.execute(command).await;

    let sessions = console.sessions().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sessions.stop();
        }
    });
    let streamed = console.finish_stream().await;
    interrupt.abort();

    // Streams end without a trailing newline.
    if streamed.is_some() {
        println!();
    }

    match (flow, streamed) {
        (Flow::Failed, _) | (_, Some(SessionOutcome::Failed(_))) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
