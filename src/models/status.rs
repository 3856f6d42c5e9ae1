//! Status payloads read by the overview.
//!
//! Every field is optional: the console shows `-` for anything the backend
//! leaves out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /health/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub worker_running: bool,
    #[serde(default)]
    pub queue_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<Value>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// `GET /rag/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagStatus {
    #[serde(default)]
    pub indexed_chunks: Option<u64>,
    #[serde(default)]
    pub embedding_model: Option<String>,
}

/// `GET /chains/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainStatus {
    #[serde(default)]
    pub chain_mode: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// `GET /rag/sources`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagSources {
    #[serde(default)]
    pub files_detected: Option<u64>,
}
