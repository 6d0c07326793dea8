use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::gitlab::{GitlabApi, ListMergeRequestsOptions};
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

const MESSAGE: &str = "Failed to list merge requests";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListMergeRequestRequest {
    /// Defaults to `opened`.
    pub state: Option<String>,
    pub labels: Vec<String>,
    pub not_labels: Vec<String>,
}

/// Lists project merge requests matching label filters.
pub struct MergeRequestListService {
    gitlab: Arc<dyn GitlabApi>,
}

impl MergeRequestListService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for MergeRequestListService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        let payload = req.payload::<ListMergeRequestRequest>()?;

        let options = ListMergeRequestsOptions {
            scope: Some("all".to_string()),
            state: Some(payload.state.clone().unwrap_or_else(|| "opened".to_string())),
            source_branch: None,
            labels: payload.labels.clone(),
            not_labels: payload.not_labels.clone(),
        };

        let result = self
            .gitlab
            .list_merge_requests(session.project_id(), &options)
            .await;
        let merge_requests = classify(result, req.route(), MESSAGE)?;

        if merge_requests.is_empty() {
            return Err(Failure::new(
                StatusCode::NOT_FOUND,
                "No merge requests found",
                "No merge requests matched the given filters",
            ));
        }

        Success::new("Merge requests fetched successfully", merge_requests)
    }
}
