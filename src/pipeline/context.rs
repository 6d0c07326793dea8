//! Merge request context resolution.
//!
//! # Responsibilities
//! - Make sure the session knows the merge request of the checked-out branch
//!   before a merge-request scoped service runs
//! - Look it up on GitLab the first time it is needed
//!
//! # Design Decisions
//! - Resolution goes through `Session::merge_iid_or_resolve`, so concurrent
//!   first requests share one lookup
//! - Failed lookups are not cached; the next request tries again

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::gitlab::{GitlabApi, ListMergeRequestsOptions};
use crate::http::envelope::Failure;
use crate::http::request::RequestEnvelope;
use crate::observability::metrics;
use crate::pipeline::{Stage, StageOutcome};
use crate::session::Session;

const LOOKUP_FAILED: &str = "Failed to list merge requests";

/// Populates the session's merge request IID.
pub struct MergeRequestResolver {
    gitlab: Arc<dyn GitlabApi>,
}

impl MergeRequestResolver {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }

    async fn lookup(&self, session: &Session) -> Result<u64, Failure> {
        let options = ListMergeRequestsOptions::open_for_branch(session.branch());
        tracing::debug!(branch = session.branch(), "Looking up merge request for branch");

        let response = self
            .gitlab
            .list_merge_requests(session.project_id(), &options)
            .await
            .map_err(|e| {
                metrics::record_merge_request_lookup("error");
                Failure::internal(LOOKUP_FAILED, e.to_string())
            })?;

        if !response.status.is_success() {
            metrics::record_merge_request_lookup("error");
            return Err(Failure::internal(
                LOOKUP_FAILED,
                format!("GitLab returned status {}", response.status.as_u16()),
            ));
        }

        let first = response.body.unwrap_or_default().into_iter().next();
        match first {
            Some(mr) => {
                metrics::record_merge_request_lookup("found");
                tracing::info!(merge_iid = mr.iid, branch = session.branch(), "Resolved merge request");
                Ok(mr.iid)
            }
            None => {
                metrics::record_merge_request_lookup("missing");
                Err(Failure::new(
                    StatusCode::BAD_REQUEST,
                    "No merge requests found",
                    format!("No merge requests found for branch '{}'", session.branch()),
                ))
            }
        }
    }
}

#[async_trait]
impl Stage for MergeRequestResolver {
    fn name(&self) -> &'static str {
        "with_merge_request"
    }

    async fn process(&self, _req: &mut RequestEnvelope, session: &Session) -> StageOutcome {
        if session.merge_iid().is_some() {
            return StageOutcome::Continue;
        }

        match session.merge_iid_or_resolve(|| self.lookup(session)).await {
            Ok(_) => StageOutcome::Continue,
            Err(failure) => StageOutcome::Respond(failure),
        }
    }
}
