use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gitlab::GitlabApi;
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

const MESSAGE: &str = "Could not get trace file for job";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JobTraceRequest {
    pub job_id: u64,
}

/// Raw log output of a CI job.
pub struct JobTraceService {
    gitlab: Arc<dyn GitlabApi>,
}

impl JobTraceService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for JobTraceService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        let payload = req.payload::<JobTraceRequest>()?;
        if payload.job_id == 0 {
            return Err(Failure::bad_request(MESSAGE, "Job ID cannot be zero"));
        }

        let result = self.gitlab.job_trace(session.project_id(), payload.job_id).await;
        let trace = classify(result, req.route(), MESSAGE)?;
        Success::new("Log file read", trace)
    }
}
