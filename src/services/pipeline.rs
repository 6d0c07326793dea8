//! CI pipeline status and retries for the session branch.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;

use crate::gitlab::{GitlabApi, Job, Pipeline, PipelineFilter};
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::{classify, path_id};
use crate::session::Session;

#[derive(Debug, Serialize)]
pub struct PipelineWithJobs {
    pub latest_pipeline: Pipeline,
    pub jobs: Vec<Job>,
}

/// Latest pipeline on the session branch, with its jobs.
pub struct PipelineService {
    gitlab: Arc<dyn GitlabApi>,
}

impl PipelineService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for PipelineService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Failed to get latest pipeline";

        let filter = PipelineFilter {
            ref_name: Some(session.branch().to_string()),
            sha: None,
        };
        let result = self.gitlab.list_pipelines(session.project_id(), &filter).await;
        // GitLab lists pipelines newest first.
        let latest = classify(result, req.route(), MESSAGE)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Failure::new(
                    StatusCode::NOT_FOUND,
                    "No pipeline found",
                    format!("No pipeline found for branch '{}'", session.branch()),
                )
            })?;

        let result = self
            .gitlab
            .list_pipeline_jobs(session.project_id(), latest.id)
            .await;
        let jobs = classify(result, req.route(), "Failed to get pipeline jobs")?;

        Success::new(
            "Pipeline retrieved",
            PipelineWithJobs {
                latest_pipeline: latest,
                jobs,
            },
        )
    }
}

/// Retries the failed jobs of `/pipeline/trigger/<id>`.
pub struct PipelineTriggerService {
    gitlab: Arc<dyn GitlabApi>,
}

impl PipelineTriggerService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for PipelineTriggerService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not retrigger pipeline";

        let pipeline_id = path_id(req, 0, "pipeline id", MESSAGE)?;
        let result = self.gitlab.retry_pipeline(session.project_id(), pipeline_id).await;
        let pipeline = classify(result, req.route(), MESSAGE)?;

        tracing::info!(pipeline_id, status = %pipeline.status, "Pipeline retriggered");
        Success::new("Pipeline retriggered", pipeline)
    }
}
