//! Interactive loop over stdin.

use tokio::io::{AsyncBufReadExt, BufReader};

use super::app::{Console, Flow};
use super::command::{Command, ParseError};

const BANNER: &str = "llm-console: type a prompt to stream it, /help for commands, /quit to leave.";

/// Read commands from stdin until `/quit`, end of input, or Ctrl+C with no
/// stream running. Ctrl+C during a stream stops the stream instead.
pub async fn run(console: &mut Console) -> std::io::Result<()> {
    console.show(BANNER);
    console.execute(Command::Overview).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                match Command::parse(&line) {
                    Ok(command) => {
                        if console.execute(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(err) => console.show_parse_error(&err),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    tracing::warn!(error = %err, "ctrl-c handler failed");
                    break;
                }
                if !console.stop_stream() {
                    break;
                }
            }
        }
    }

    console.stop_stream();
    console.finish_stream().await;
    Ok(())
}
