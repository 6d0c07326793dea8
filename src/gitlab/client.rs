//! reqwest-backed GitLab REST v4 client.
//!
//! # Responsibilities
//! - Build `/api/v4` endpoint URLs (project ids percent-encoded as one segment)
//! - Authenticate with the `PRIVATE-TOKEN` header
//! - Optionally log every outgoing request and incoming response
//! - Report status codes; decode bodies only for 2xx responses

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::config::{BridgeConfig, DebugSettings};
use crate::gitlab::types::*;
use crate::gitlab::{GitlabApi, Upstream, UpstreamError, UpstreamResult};

const TOKEN_HEADER: &str = "private-token";
const LOG_TARGET: &str = "gitlab_bridge::upstream";

/// Client for one GitLab instance.
#[derive(Clone)]
pub struct GitlabClient {
    http: reqwest::Client,
    api_base: Url,
    token: String,
    debug: DebugSettings,
}

impl GitlabClient {
    /// Create a client for the instance at `gitlab_url`.
    pub fn new(
        gitlab_url: &str,
        token: impl Into<String>,
        debug: DebugSettings,
    ) -> Result<Self, UpstreamError> {
        let mut api_base = Url::parse(gitlab_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", gitlab_url, e)))?;
        api_base
            .path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(gitlab_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v4"]);

        let http = reqwest::Client::builder()
            .user_agent(concat!("gitlab-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base,
            token: token.into(),
            debug,
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self, UpstreamError> {
        Self::new(&config.gitlab_url, config.auth_token.clone(), config.debug)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.api_base.to_string()))?
            .extend(segments);
        Ok(url)
    }

    fn project_url(&self, project_id: &str, rest: &[&str]) -> Result<Url, UpstreamError> {
        let mut segments = vec!["projects", project_id];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<(StatusCode, Bytes), UpstreamError> {
        let request = builder.header(TOKEN_HEADER, &self.token).build()?;

        if self.debug.request {
            let mut headers = request.headers().clone();
            headers.insert(TOKEN_HEADER, HeaderValue::from_static("xxxx"));
            tracing::info!(
                target: LOG_TARGET,
                method = %request.method(),
                url = %request.url(),
                headers = ?headers,
                "-- REQUEST --"
            );
        }

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if self.debug.response {
            tracing::info!(
                target: LOG_TARGET,
                status = %status,
                body = %String::from_utf8_lossy(&body),
                "-- RESPONSE --"
            );
        }

        Ok((status, body))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> UpstreamResult<T> {
        let (status, body) = self.execute(builder).await?;
        if !status.is_success() {
            return Ok(Upstream::rejected(status));
        }
        Ok(Upstream::ok(status, serde_json::from_slice(&body)?))
    }

    async fn empty(&self, builder: RequestBuilder) -> UpstreamResult<()> {
        let (status, _) = self.execute(builder).await?;
        if !status.is_success() {
            return Ok(Upstream::rejected(status));
        }
        Ok(Upstream::ok(status, ()))
    }

    async fn text(&self, builder: RequestBuilder) -> UpstreamResult<String> {
        let (status, body) = self.execute(builder).await?;
        if !status.is_success() {
            return Ok(Upstream::rejected(status));
        }
        Ok(Upstream::ok(status, String::from_utf8_lossy(&body).into_owned()))
    }
}

#[async_trait]
impl GitlabApi for GitlabClient {
    async fn list_merge_requests(
        &self,
        project_id: &str,
        options: &ListMergeRequestsOptions,
    ) -> UpstreamResult<Vec<MergeRequest>> {
        let url = self.project_url(project_id, &["merge_requests"])?;
        self.json(self.http.get(url).query(&options.query())).await
    }

    async fn create_merge_request(
        &self,
        project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> UpstreamResult<MergeRequest> {
        let url = self.project_url(project_id, &["merge_requests"])?;
        self.json(self.http.post(url).json(options)).await
    }

    async fn list_project_members(&self, project_id: &str) -> UpstreamResult<Vec<ProjectMember>> {
        let url = self.project_url(project_id, &["members", "all"])?;
        self.json(self.http.get(url).query(&[("per_page", "100")])).await
    }

    async fn current_user(&self) -> UpstreamResult<User> {
        let url = self.url(&["user"])?;
        self.json(self.http.get(url)).await
    }

    async fn list_pipelines(
        &self,
        project_id: &str,
        filter: &PipelineFilter,
    ) -> UpstreamResult<Vec<Pipeline>> {
        let url = self.project_url(project_id, &["pipelines"])?;
        self.json(self.http.get(url).query(&filter.query())).await
    }

    async fn list_pipeline_jobs(&self, project_id: &str, pipeline_id: u64) -> UpstreamResult<Vec<Job>> {
        let url = self.project_url(project_id, &["pipelines", &pipeline_id.to_string(), "jobs"])?;
        self.json(self.http.get(url)).await
    }

    async fn retry_pipeline(&self, project_id: &str, pipeline_id: u64) -> UpstreamResult<Pipeline> {
        let url = self.project_url(project_id, &["pipelines", &pipeline_id.to_string(), "retry"])?;
        self.json(self.http.post(url)).await
    }

    async fn job_trace(&self, project_id: &str, job_id: u64) -> UpstreamResult<String> {
        let url = self.project_url(project_id, &["jobs", &job_id.to_string(), "trace"])?;
        self.text(self.http.get(url)).await
    }

    async fn upload_file(
        &self,
        project_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> UpstreamResult<ProjectFile> {
        let url = self.project_url(project_id, &["uploads"])?;
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.json(self.http.post(url).multipart(form)).await
    }

    async fn create_note_award_emoji(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        name: &str,
    ) -> UpstreamResult<AwardEmoji> {
        let url = self.project_url(
            project_id,
            &[
                "merge_requests",
                &merge_iid.to_string(),
                "notes",
                &note_id.to_string(),
                "award_emoji",
            ],
        )?;
        self.json(self.http.post(url).json(&json!({ "name": name }))).await
    }

    async fn delete_note_award_emoji(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        award_id: u64,
    ) -> UpstreamResult<()> {
        let url = self.project_url(
            project_id,
            &[
                "merge_requests",
                &merge_iid.to_string(),
                "notes",
                &note_id.to_string(),
                "award_emoji",
                &award_id.to_string(),
            ],
        )?;
        self.empty(self.http.delete(url)).await
    }

    async fn list_draft_notes(&self, project_id: &str, merge_iid: u64) -> UpstreamResult<Vec<DraftNote>> {
        let url = self.project_url(project_id, &["merge_requests", &merge_iid.to_string(), "draft_notes"])?;
        self.json(self.http.get(url)).await
    }

    async fn create_draft_note(
        &self,
        project_id: &str,
        merge_iid: u64,
        options: &CreateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote> {
        let url = self.project_url(project_id, &["merge_requests", &merge_iid.to_string(), "draft_notes"])?;
        self.json(self.http.post(url).json(options)).await
    }

    async fn update_draft_note(
        &self,
        project_id: &str,
        merge_iid: u64,
        note_id: u64,
        options: &UpdateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote> {
        let url = self.project_url(
            project_id,
            &["merge_requests", &merge_iid.to_string(), "draft_notes", &note_id.to_string()],
        )?;
        self.json(self.http.put(url).json(options)).await
    }

    async fn delete_draft_note(&self, project_id: &str, merge_iid: u64, note_id: u64) -> UpstreamResult<()> {
        let url = self.project_url(
            project_id,
            &["merge_requests", &merge_iid.to_string(), "draft_notes", &note_id.to_string()],
        )?;
        self.empty(self.http.delete(url)).await
    }

    async fn publish_draft_note(&self, project_id: &str, merge_iid: u64, note_id: u64) -> UpstreamResult<()> {
        let url = self.project_url(
            project_id,
            &[
                "merge_requests",
                &merge_iid.to_string(),
                "draft_notes",
                &note_id.to_string(),
                "publish",
            ],
        )?;
        self.empty(self.http.put(url)).await
    }

    async fn publish_all_draft_notes(&self, project_id: &str, merge_iid: u64) -> UpstreamResult<()> {
        let url = self.project_url(
            project_id,
            &["merge_requests", &merge_iid.to_string(), "draft_notes", "bulk_publish"],
        )?;
        self.empty(self.http.post(url)).await
    }
}
