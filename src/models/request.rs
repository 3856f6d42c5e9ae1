use serde::{Deserialize, Serialize};

/// Body of `/query/sync`, `/query/async` and `/jobs/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Body of `/rag/index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub rebuild: bool,
}

impl Default for IndexRequest {
    fn default() -> Self {
        Self { rebuild: true }
    }
}

/// Body of `/rag/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: u32,
}

/// Body of `/rag/ask-async`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    pub top_k: u32,
}

/// Body of `/chains/ask-async`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAskRequest {
    pub prompt: String,
    pub top_k: u32,
    pub use_rag: bool,
    pub use_tools: bool,
}

impl ChainAskRequest {
    /// Both retrieval and tools enabled, like the backend default.
    pub fn new(prompt: impl Into<String>, top_k: u32) -> Self {
        Self {
            prompt: prompt.into(),
            top_k,
            use_rag: true,
            use_tools: true,
        }
    }
}
