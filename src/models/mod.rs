//! Typed backend payloads.
//!
//! Only payloads whose fields the client reads are typed; everything else
//! stays a `serde_json::Value` and is rendered as-is.

mod job;
mod overview;
mod request;
mod status;

pub use job::JobHandle;
pub use overview::Overview;
pub use request::{AskRequest, ChainAskRequest, IndexRequest, PromptRequest, SearchRequest};
pub use status::{ChainStatus, HealthStatus, RagSources, RagStatus};
