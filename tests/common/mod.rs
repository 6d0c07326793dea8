//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use gitlab_bridge::gitlab::*;
use gitlab_bridge::services::DiskFileReader;
use gitlab_bridge::{Dependencies, Dispatcher, Session, Shutdown};

pub const PROJECT: &str = "group/project";
pub const BRANCH: &str = "feature/login";

/// How every fake upstream call completes.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok,
    Status(u16),
    Error(String),
}

/// In-memory GitLab with a programmable outcome.
pub struct FakeGitlab {
    outcome: Mutex<Outcome>,
    merge_requests: Mutex<Vec<MergeRequest>>,
    list_calls: AtomicUsize,
    list_delay: Duration,
    created: Mutex<Vec<CreateMergeRequestOptions>>,
    published: Mutex<Vec<String>>,
}

impl FakeGitlab {
    pub fn new() -> Self {
        Self {
            outcome: Mutex::new(Outcome::Ok),
            merge_requests: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            list_delay: Duration::ZERO,
            created: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Fake with one open merge request for the test branch.
    pub fn with_merge_request(iid: u64) -> Self {
        let fake = Self::new();
        fake.merge_requests.lock().unwrap().push(merge_request(iid));
        fake
    }

    pub fn list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<CreateMergeRequestOptions> {
        self.created.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    fn respond<T>(&self, body: T) -> UpstreamResult<T> {
        match self.outcome.lock().unwrap().clone() {
            Outcome::Ok => Ok(Upstream::ok(StatusCode::OK, body)),
            Outcome::Status(code) => Ok(Upstream::rejected(StatusCode::from_u16(code).unwrap())),
            Outcome::Error(text) => Err(UpstreamError::Other(text)),
        }
    }
}

pub fn merge_request(iid: u64) -> MergeRequest {
    MergeRequest {
        id: 1000 + iid,
        iid,
        title: format!("MR {}", iid),
        state: "opened".to_string(),
        source_branch: BRANCH.to_string(),
        target_branch: "main".to_string(),
        ..MergeRequest::default()
    }
}

#[async_trait]
impl GitlabApi for FakeGitlab {
    async fn list_merge_requests(
        &self,
        _project_id: &str,
        _options: &ListMergeRequestsOptions,
    ) -> UpstreamResult<Vec<MergeRequest>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        let merge_requests = self.merge_requests.lock().unwrap().clone();
        self.respond(merge_requests)
    }

    async fn create_merge_request(
        &self,
        _project_id: &str,
        options: &CreateMergeRequestOptions,
    ) -> UpstreamResult<MergeRequest> {
        self.created.lock().unwrap().push(options.clone());
        self.respond(MergeRequest {
            iid: 7,
            title: options.title.clone(),
            source_branch: options.source_branch.clone(),
            target_branch: options.target_branch.clone(),
            ..MergeRequest::default()
        })
    }

    async fn list_project_members(&self, _project_id: &str) -> UpstreamResult<Vec<ProjectMember>> {
        self.respond(vec![ProjectMember {
            id: 1,
            username: "alice".to_string(),
            ..ProjectMember::default()
        }])
    }

    async fn current_user(&self) -> UpstreamResult<User> {
        self.respond(User {
            id: 1,
            username: "alice".to_string(),
            ..User::default()
        })
    }

    async fn list_pipelines(
        &self,
        _project_id: &str,
        filter: &PipelineFilter,
    ) -> UpstreamResult<Vec<Pipeline>> {
        self.respond(vec![Pipeline {
            id: 55,
            status: "success".to_string(),
            ref_name: filter.ref_name.clone().unwrap_or_default(),
            ..Pipeline::default()
        }])
    }

    async fn list_pipeline_jobs(&self, _project_id: &str, _pipeline_id: u64) -> UpstreamResult<Vec<Job>> {
        self.respond(vec![Job {
            id: 9,
            name: "test".to_string(),
            ..Job::default()
        }])
    }

    async fn retry_pipeline(&self, _project_id: &str, pipeline_id: u64) -> UpstreamResult<Pipeline> {
        self.respond(Pipeline {
            id: pipeline_id,
            status: "pending".to_string(),
            ..Pipeline::default()
        })
    }

    async fn job_trace(&self, _project_id: &str, job_id: u64) -> UpstreamResult<String> {
        self.respond(format!("trace of job {}", job_id))
    }

    async fn upload_file(
        &self,
        _project_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> UpstreamResult<ProjectFile> {
        self.respond(ProjectFile {
            alt: file_name.to_string(),
            url: format!("/uploads/{}/{}", contents.len(), file_name),
            ..ProjectFile::default()
        })
    }

    async fn create_note_award_emoji(
        &self,
        _project_id: &str,
        _merge_iid: u64,
        note_id: u64,
        name: &str,
    ) -> UpstreamResult<AwardEmoji> {
        self.respond(AwardEmoji {
            id: 3,
            name: name.to_string(),
            awardable_id: note_id,
            ..AwardEmoji::default()
        })
    }

    async fn delete_note_award_emoji(
        &self,
        _project_id: &str,
        _merge_iid: u64,
        _note_id: u64,
        _award_id: u64,
    ) -> UpstreamResult<()> {
        self.respond(())
    }

    async fn list_draft_notes(&self, _project_id: &str, merge_iid: u64) -> UpstreamResult<Vec<DraftNote>> {
        self.respond(vec![DraftNote {
            id: 1,
            merge_request_id: merge_iid,
            note: "draft".to_string(),
            ..DraftNote::default()
        }])
    }

    async fn create_draft_note(
        &self,
        _project_id: &str,
        merge_iid: u64,
        options: &CreateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote> {
        self.respond(DraftNote {
            id: 2,
            merge_request_id: merge_iid,
            note: options.note.clone(),
            discussion_id: options.in_reply_to_discussion_id.clone(),
            ..DraftNote::default()
        })
    }

    async fn update_draft_note(
        &self,
        _project_id: &str,
        merge_iid: u64,
        note_id: u64,
        options: &UpdateDraftNoteOptions,
    ) -> UpstreamResult<DraftNote> {
        self.respond(DraftNote {
            id: note_id,
            merge_request_id: merge_iid,
            note: options.note.clone(),
            ..DraftNote::default()
        })
    }

    async fn delete_draft_note(&self, _project_id: &str, _merge_iid: u64, _note_id: u64) -> UpstreamResult<()> {
        self.respond(())
    }

    async fn publish_draft_note(&self, _project_id: &str, merge_iid: u64, note_id: u64) -> UpstreamResult<()> {
        self.published.lock().unwrap().push(format!("{}:{}", merge_iid, note_id));
        self.respond(())
    }

    async fn publish_all_draft_notes(&self, _project_id: &str, merge_iid: u64) -> UpstreamResult<()> {
        self.published.lock().unwrap().push(format!("{}:all", merge_iid));
        self.respond(())
    }
}

/// Router plus the handles a test needs to inspect.
pub struct Harness {
    pub router: Router,
    pub gitlab: Arc<FakeGitlab>,
    pub session: Arc<Session>,
    pub shutdown: Shutdown,
}

pub fn session() -> Session {
    Session::new(PROJECT, BRANCH, "https://gitlab.example.com")
}

pub fn harness(gitlab: FakeGitlab) -> Harness {
    harness_with_session(gitlab, session())
}

pub fn harness_with_session(gitlab: FakeGitlab, session: Session) -> Harness {
    let gitlab = Arc::new(gitlab);
    let session = Arc::new(session);
    let shutdown = Shutdown::new();
    let router = Dispatcher::new(Dependencies {
        session: session.clone(),
        gitlab: gitlab.clone(),
        files: Arc::new(DiskFileReader),
        shutdown: shutdown.clone(),
    })
    .into_router();

    Harness {
        router,
        gitlab,
        session,
        shutdown,
    }
}

/// Send one request through the router and decode the JSON envelope.
pub async fn send(router: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Send a raw body, for malformed JSON cases.
pub async fn send_raw(router: &Router, method: Method, path: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
