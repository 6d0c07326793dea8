//! Upstream GitLab facade.
//!
//! # Data Flow
//! ```text
//! service / context resolver
//!     → GitlabApi operation (trait object)
//!     → client.rs (reqwest, PRIVATE-TOKEN auth)
//!     → Upstream { status, body } | UpstreamError
//!     → services::classify (three-way classification)
//! ```
//!
//! # Design Decisions
//! - Every operation reports the HTTP status alongside the decoded body
//! - Non-2xx is not an error at this layer; callers decide what it means
//! - Trait object seam so tests inject arbitrary (body, status, error) outcomes

pub mod client;
pub mod types;

use async_trait::async_trait;
use axum::http::StatusCode;

pub use client::GitlabClient;
pub use types::*;

/// Errors that prevent an upstream call from producing a status at all.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or other transport failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not match the expected entity.
    #[error("Could not decode GitLab response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid GitLab URL: {0}")]
    InvalidUrl(String),

    /// Any other failure, carried as text (used by test doubles).
    #[error("{0}")]
    Other(String),
}

/// Status plus body of a completed upstream call.
///
/// `body` is only present for 2xx responses.
#[derive(Debug, Clone, PartialEq)]
pub struct Upstream<T> {
    pub status: StatusCode,
    pub body: Option<T>,
}

impl<T> Upstream<T> {
    pub fn ok(status: StatusCode, body: T) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// A completed call the API rejected.
    pub fn rejected(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

pub type UpstreamResult<T> = Result<Upstream<T>, UpstreamError>;

/// Remote operations the services need.
#[async_trait]
pub trait GitlabApi: Send + Sync {
    async fn list_merge_requests(
        &self,
        project_id: &str,
        options: &ListMergeRequestsOptions,
    ) -> UpstreamResult<Vec<MergeRequest>>;

    async fn create_merge_request(
        &self,
        project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> UpstreamResult<MergeRequest>;

    async fn list_project_members(&self, project_id: &str) -> UpstreamResult<Vec<ProjectMember>>;

    async fn current_user(&self) -> UpstreamResult<User>;

    async fn list_pipelines(
        &self,
        project_id: &str,
        filter: &PipelineFilter,
    ) -> UpstreamResult<Vec<Pipeline>>;

    async fn list_pipeline_jobs(&self, project_id: &str, pipeline_id: u64) -> UpstreamResult<Vec<Job>>;

    async fn retry_pipeline(&self, project_id: &str, pipeline_id: u64) -> UpstreamResult<Pipeline>;

    async fn job_trace(&self, project_id: &str, job_id: u64) -> UpstreamResult<String>;

    async fn upload_file(
        &self,
        project_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> UpstreamResult<ProjectFile>;

    async fn create_note_award_emoji(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        name: &str,
    ) -> UpstreamResult<AwardEmoji>;

    async fn delete_note_award_emoji(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        award_id: u64,
    ) -> UpstreamResult<()>;

    async fn list_draft_notes(&self, project_id: &str, merge_iid: u64) -> UpstreamResult<Vec<DraftNote>>;

    async fn create_draft_note(
        &self,
        project_id: &str,
        merge_iid: u64,
        options: &CreateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote>;

    async fn update_draft_note(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        options: &UpdateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote>;

    async fn delete_draft_note(&self, project_id: &str, merge_iid: u64, note_id: u64) -> UpstreamResult<()>;

    async fn publish_draft_note(&self, project_id: &str, merge_iid: u64, note_id: u64) -> UpstreamResult<()>;

    async fn publish_all_draft_notes(&self, project_id: &str, merge_iid: u64) -> UpstreamResult<()>;
}
