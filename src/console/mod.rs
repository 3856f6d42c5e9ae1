//! Terminal front end.
//!
//! - `command` - [`Command`] and its `/name` syntax
//! - `render` - [`RenderSink`] implementations and display text
//! - `app` - [`Console`], which executes commands
//! - `repl` - the interactive stdin loop

mod app;
mod command;
pub mod render;
pub mod repl;

pub use app::{Console, Flow};
pub use command::{Command, ParseError, HELP};
pub use render::{BufferSink, RenderSink, RenderStreamSink, StdoutSink};
