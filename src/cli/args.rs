//! Command-line arguments.

use clap::{Parser, Subcommand};

use crate::config::ClientConfig;
use crate::console::Command;
use crate::error::ConfigError;

#[derive(Debug, Parser)]
#[command(name = "llm-console")]
#[command(version)]
#[command(about = "Console for the LLM backend: queries, jobs, RAG, chains and streaming")]
pub struct Cli {
    /// Backend base URL [env: LLM_CONSOLE_URL]
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Retrieval depth for RAG and chain requests (1-20) [env: LLM_CONSOLE_TOP_K]
    #[arg(long, global = true, value_name = "N")]
    pub top_k: Option<u32>,

    /// Entries requested from the chain tool log [env: LLM_CONSOLE_LOG_LIMIT]
    #[arg(long, global = true, value_name = "N")]
    pub log_limit: Option<u32>,

    /// Log filter such as `debug` or `llm_console=trace` (default: RUST_LOG, then `warn`)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Run one command and exit; without one the interactive console starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply flag overrides on top of `base` and validate the result.
    pub fn config(&self, base: ClientConfig) -> Result<ClientConfig, ConfigError> {
        let mut config = base;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(top_k) = self.top_k {
            config = config.with_default_top_k(top_k);
        }
        if let Some(limit) = self.log_limit {
            config = config.with_tool_log_limit(limit);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Raw /health/ response
    Health,
    /// Service, worker, index and chain summary
    Overview,
    /// Plain completions
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },
    /// Background jobs
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Stream an answer token by token (Ctrl+C stops it)
    Stream {
        /// The prompt to stream
        prompt: String,
    },
    /// Retrieval-augmented generation
    Rag {
        #[command(subcommand)]
        command: RagCommands,
    },
    /// Tool chains
    Chain {
        #[command(subcommand)]
        command: ChainCommands,
    },
    /// Demo endpoints
    Demo {
        #[command(subcommand)]
        command: DemoCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum QueryCommands {
    /// POST /query/sync
    Sync { prompt: String },
    /// POST /query/async
    Async { prompt: String },
    /// Run sync then async and compare elapsed time
    Compare { prompt: String },
}

#[derive(Debug, Subcommand)]
pub enum JobCommands {
    /// Submit a background job
    Submit { prompt: String },
    /// Fetch a job's current status
    Poll {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum RagCommands {
    /// Rebuild the index
    Index,
    /// Search indexed chunks
    Search { query: String },
    /// Answer with retrieved context
    Ask { prompt: String },
    /// Index status
    Status,
    /// Source files detected
    Sources,
}

#[derive(Debug, Subcommand)]
pub enum ChainCommands {
    /// Run the tool chain
    Ask {
        prompt: String,
        /// Skip retrieval
        #[arg(long)]
        no_rag: bool,
        /// Skip tool calls
        #[arg(long)]
        no_tools: bool,
    },
    /// Recent tool invocations
    Logs,
    /// Chain mode and tools
    Status,
}

#[derive(Debug, Subcommand)]
pub enum DemoCommands {
    /// Route latency metrics
    Metrics,
    /// Blocking endpoint (about 5 seconds)
    Sync,
    /// Non-blocking endpoint (about 5 seconds)
    Async,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Health => Command::Health,
            Commands::Overview => Command::Overview,
            Commands::Query { command } => match command {
                QueryCommands::Sync { prompt } => Command::QuerySync(prompt.trim().to_string()),
                QueryCommands::Async { prompt } => Command::QueryAsync(prompt.trim().to_string()),
                QueryCommands::Compare { prompt } => Command::Compare(prompt.trim().to_string()),
            },
            Commands::Job { command } => match command {
                JobCommands::Submit { prompt } => Command::JobSubmit(prompt.trim().to_string()),
                JobCommands::Poll { job_id } => {
                    let job_id = job_id.trim().to_string();
                    Command::JobPoll((!job_id.is_empty()).then_some(job_id))
                }
            },
            Commands::Stream { prompt } => Command::Stream(prompt.trim().to_string()),
            Commands::Rag { command } => match command {
                RagCommands::Index => Command::RagIndex,
                RagCommands::Search { query } => Command::RagSearch(query.trim().to_string()),
                RagCommands::Ask { prompt } => Command::RagAsk(prompt.trim().to_string()),
                RagCommands::Status => Command::RagStatus,
                RagCommands::Sources => Command::RagSources,
            },
            Commands::Chain { command } => match command {
                ChainCommands::Ask {
                    prompt,
                    no_rag,
                    no_tools,
                } => Command::ChainAsk {
                    prompt: prompt.trim().to_string(),
                    use_rag: !no_rag,
                    use_tools: !no_tools,
                },
                ChainCommands::Logs => Command::ChainLogs,
                ChainCommands::Status => Command::ChainStatus,
            },
            Commands::Demo { command } => match command {
                DemoCommands::Metrics => Command::DemoMetrics,
                DemoCommands::Sync => Command::DemoSync,
                DemoCommands::Async => Command::DemoAsync,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = parse(&["llm-console"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["llm-console", "stream", "hello", "--base-url", "http://x:1"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://x:1"));
        assert_eq!(
            Command::from(cli.command.unwrap()),
            Command::Stream("hello".to_string())
        );
    }

    #[test]
    fn test_nested_subcommands_convert() {
        let cli = parse(&["llm-console", "query", "compare", "  why  "]);
        assert_eq!(
            Command::from(cli.command.unwrap()),
            Command::Compare("why".to_string())
        );

        let cli = parse(&["llm-console", "chain", "ask", "plan it", "--no-tools"]);
        assert_eq!(
            Command::from(cli.command.unwrap()),
            Command::ChainAsk {
                prompt: "plan it".to_string(),
                use_rag: true,
                use_tools: false,
            }
        );

        let cli = parse(&["llm-console", "job", "poll", "abc"]);
        assert_eq!(
            Command::from(cli.command.unwrap()),
            Command::JobPoll(Some("abc".to_string()))
        );
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["llm-console", "--top-k", "9", "--base-url", "http://h:2/"]);
        let config = cli.config(ClientConfig::default()).unwrap();
        assert_eq!(config.default_top_k, 9);
        assert_eq!(config.base_url, "http://h:2");
        assert_eq!(config.tool_log_limit, 50);
    }

    #[test]
    fn test_invalid_flag_values_rejected() {
        let cli = parse(&["llm-console", "--top-k", "21"]);
        assert_eq!(
            cli.config(ClientConfig::default()),
            Err(ConfigError::TopKOutOfRange(21))
        );

        let cli = parse(&["llm-console", "--base-url", "ftp://h"]);
        assert!(matches!(
            cli.config(ClientConfig::default()),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
