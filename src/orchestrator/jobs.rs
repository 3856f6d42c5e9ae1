//! Background job submit/poll.

use serde_json::Value;

use super::{Orchestrator, JOBS_PATH, JOBS_SUBMIT_PATH};
use crate::backend::RequestDescriptor;
use crate::error::ClientResult;
use crate::models::{JobHandle, PromptRequest};

/// What `/jobs/submit` answered.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSubmission {
    pub handle: JobHandle,
    /// Full response, for display
    pub body: Value,
}

impl Orchestrator {
    /// Queue a background job.
    ///
    /// A 2xx answer without a `job_id` is a parse error.
    pub async fn submit_job(&self, prompt: &str) -> ClientResult<JobSubmission> {
        let envelope = self
            .client
            .call(&RequestDescriptor::post_json(
                JOBS_SUBMIT_PATH,
                &PromptRequest::new(prompt),
            ))
            .await?;

        let handle: JobHandle = envelope.json()?;
        tracing::info!(job_id = %handle, "job submitted");

        Ok(JobSubmission {
            handle,
            body: envelope.into_body(),
        })
    }

    /// Current status of a job, fetched fresh on every call.
    pub async fn poll_job(&self, handle: &JobHandle) -> ClientResult<Value> {
        let path = format!("{}/{}", JOBS_PATH, urlencoding::encode(handle.id()));
        tracing::debug!(job_id = %handle, "polling job");
        self.call(&RequestDescriptor::get(path)).await
    }
}
