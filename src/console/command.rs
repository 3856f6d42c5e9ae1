//! Console commands and their `/name` syntax.
//!
//! Input starting with `/` is a command; anything else is streamed as a
//! prompt. Arguments are the rest of the line, trimmed. Empty arguments are
//! kept so the console can answer with a hint instead of sending a request.

/// Everything the console can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Primary: /help
    /// Aliases: /?
    Help,
    /// Primary: /clear
    Clear,
    /// Primary: /quit
    /// Aliases: /exit, /q
    Quit,

    /// Primary: /overview
    /// Aliases: /refresh
    Overview,
    /// Primary: /health
    Health,

    /// Primary: /sync
    QuerySync(String),
    /// Primary: /async
    QueryAsync(String),
    /// Primary: /compare
    Compare(String),

    /// Primary: /submit
    JobSubmit(String),
    /// Primary: /poll
    /// Without an id the last submitted job is polled.
    JobPoll(Option<String>),

    /// Primary: /stream
    /// Also any input without a leading `/`.
    Stream(String),
    /// Primary: /stop
    Stop,

    /// Primary: /index
    RagIndex,
    /// Primary: /search
    RagSearch(String),
    /// Primary: /ask
    RagAsk(String),
    /// Primary: /rag
    RagStatus,
    /// Primary: /sources
    RagSources,

    /// Primary: /chain
    /// Leading `--no-rag` / `--no-tools` flags switch those stages off.
    ChainAsk {
        prompt: String,
        use_rag: bool,
        use_tools: bool,
    },
    /// Primary: /logs
    ChainLogs,
    /// Primary: /chains
    ChainStatus,

    /// Primary: /metrics
    DemoMetrics,
    /// Primary: /demo-sync
    DemoSync,
    /// Primary: /demo-async
    DemoAsync,

    /// Primary: /topk
    /// Without a value the current setting is shown.
    TopK(Option<String>),
}

/// Why a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
}

/// Help table: (usage, description).
pub const HELP: &[(&str, &str)] = &[
    ("<prompt>", "stream an answer (same as /stream)"),
    ("/stream <prompt>", "stream an answer"),
    ("/stop", "stop the running stream"),
    ("/sync <prompt>", "run /query/sync"),
    ("/async <prompt>", "run /query/async"),
    ("/compare <prompt>", "run sync then async and compare timings"),
    ("/submit <prompt>", "submit a background job"),
    ("/poll [job id]", "poll a job (defaults to the last one submitted)"),
    ("/index", "rebuild the RAG index"),
    ("/search <query>", "search the RAG index"),
    ("/ask <prompt>", "ask with retrieval"),
    ("/rag", "RAG status"),
    ("/sources", "RAG sources detected"),
    ("/chain [--no-rag] [--no-tools] <prompt>", "run the tool chain"),
    ("/logs", "recent chain tool logs"),
    ("/chains", "chain status"),
    ("/metrics", "route latency metrics"),
    ("/demo-sync", "blocking demo endpoint"),
    ("/demo-async", "non-blocking demo endpoint"),
    ("/topk [n]", "show or set retrieval depth"),
    ("/overview", "refresh the overview"),
    ("/health", "raw health check"),
    ("/clear", "clear the console"),
    ("/help", "this help"),
    ("/quit", "leave"),
];

impl Command {
    /// Parse one input line.
    ///
    /// # Examples
    ///
    /// ```
    /// use llm_console::console::Command;
    ///
    /// assert_eq!(Command::parse("/stop"), Ok(Command::Stop));
    /// assert_eq!(Command::parse("hello"), Ok(Command::Stream("hello".into())));
    /// assert_eq!(Command::parse("/poll"), Ok(Command::JobPoll(None)));
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let Some(body) = input.strip_prefix('/') else {
            return Ok(Command::Stream(input.to_string()));
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let arg = rest.to_string();
        let optional = (!rest.is_empty()).then(|| arg.clone());

        let command = match name.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "clear" => Command::Clear,
            "quit" | "exit" | "q" => Command::Quit,
            "overview" | "refresh" => Command::Overview,
            "health" => Command::Health,
            "sync" => Command::QuerySync(arg),
            "async" => Command::QueryAsync(arg),
            "compare" => Command::Compare(arg),
            "submit" => Command::JobSubmit(arg),
            "poll" => Command::JobPoll(optional),
            "stream" => Command::Stream(arg),
            "stop" => Command::Stop,
            "index" => Command::RagIndex,
            "search" => Command::RagSearch(arg),
            "ask" => Command::RagAsk(arg),
            "rag" => Command::RagStatus,
            "sources" => Command::RagSources,
            "chain" => parse_chain(rest),
            "logs" => Command::ChainLogs,
            "chains" => Command::ChainStatus,
            "metrics" => Command::DemoMetrics,
            "demo-sync" => Command::DemoSync,
            "demo-async" => Command::DemoAsync,
            "topk" | "top-k" => Command::TopK(optional),
            other => return Err(ParseError::Unknown(format!("/{}", other))),
        };
        Ok(command)
    }
}

fn parse_chain(rest: &str) -> Command {
    let mut use_rag = true;
    let mut use_tools = true;
    let mut remaining = rest;

    loop {
        let (word, tail) = match remaining.split_once(char::is_whitespace) {
            Some((word, tail)) => (word, tail.trim_start()),
            None => (remaining, ""),
        };
        match word {
            "--no-rag" => use_rag = false,
            "--no-tools" => use_tools = false,
            _ => break,
        }
        remaining = tail;
    }

    Command::ChainAsk {
        prompt: remaining.trim().to_string(),
        use_rag,
        use_tools,
    }
}
