//! llm-console - an interactive client for the LLM backend
//!
//! This library exposes modules for use by the binary and integration tests.

pub mod adapters;
pub mod backend;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod sse;
pub mod traits;
