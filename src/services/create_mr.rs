use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gitlab::{CreateMergeRequestOptions, GitlabApi};
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

const MESSAGE: &str = "Could not create MR";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CreateMrRequest {
    pub title: String,
    pub description: String,
    pub target_branch: String,
    pub delete_branch: bool,
    pub squash: bool,
    pub forked_project_id: Option<u64>,
}

/// Opens a merge request from the session branch.
pub struct CreateMrService {
    gitlab: Arc<dyn GitlabApi>,
}

impl CreateMrService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for CreateMrService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        let payload = req.payload::<CreateMrRequest>()?;

        if payload.title.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "Title cannot be empty"));
        }
        if payload.target_branch.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "Target branch cannot be empty"));
        }

        let options = CreateMergeRequestOptions {
            title: payload.title.clone(),
            description: payload.description.clone(),
            source_branch: session.branch().to_string(),
            target_branch: payload.target_branch.clone(),
            remove_source_branch: payload.delete_branch,
            squash: payload.squash,
            target_project_id: payload.forked_project_id,
        };

        let result = self
            .gitlab
            .create_merge_request(session.project_id(), &options)
            .await;
        let merge_request = classify(result, req.route(), MESSAGE)?;

        tracing::info!(iid = merge_request.iid, target = %payload.target_branch, "Merge request created");
        Success::new(format!("MR '{}' created", payload.title), merge_request)
    }
}
