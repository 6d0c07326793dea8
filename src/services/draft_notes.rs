//! Draft (pending review) notes on the branch's merge request.
//!
//! Drafts stay private until published, either one at a time or in bulk.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gitlab::{CreateDraftNoteOptions, GitlabApi, UpdateDraftNoteOptions};
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::{classify, merge_iid, path_id, unsupported};
use crate::session::Session;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CreateDraftNoteRequest {
    pub comment: String,
    pub discussion_id: Option<String>,
    pub position: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpdateDraftNoteRequest {
    pub note: String,
    pub position: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DraftNotePublishRequest {
    pub note: Option<u64>,
    pub publish_all: bool,
}

/// List, create, update and delete drafts.
pub struct DraftNoteService {
    gitlab: Arc<dyn GitlabApi>,
}

impl DraftNoteService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }

    async fn list(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not get draft notes";

        let iid = merge_iid(session, MESSAGE)?;
        let result = self.gitlab.list_draft_notes(session.project_id(), iid).await;
        let notes = classify(result, req.route(), MESSAGE)?;
        Success::new("Draft notes fetched successfully", notes)
    }

    async fn create(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not create draft note";

        let payload = req.payload::<CreateDraftNoteRequest>()?;
        if payload.comment.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "Must provide comment"));
        }
        let iid = merge_iid(session, MESSAGE)?;

        let options = CreateDraftNoteOptions {
            note: payload.comment.clone(),
            in_reply_to_discussion_id: payload.discussion_id.clone(),
            position: payload.position.clone(),
        };
        let result = self
            .gitlab
            .create_draft_note(session.project_id(), iid, &options)
            .await;
        let note = classify(result, req.route(), MESSAGE)?;
        Success::new("Draft note created successfully", note)
    }

    async fn update(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not update draft note";

        let note_id = path_id(req, 0, "draft note id", MESSAGE)?;
        let payload = req.payload::<UpdateDraftNoteRequest>()?;
        if payload.note.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "Must supply draft note text"));
        }
        let iid = merge_iid(session, MESSAGE)?;

        let options = UpdateDraftNoteOptions {
            note: payload.note.clone(),
            position: payload.position.clone(),
        };
        let result = self
            .gitlab
            .update_draft_note(session.project_id(), iid, note_id, &options)
            .await;
        let note = classify(result, req.route(), MESSAGE)?;
        Success::new("Draft note updated", note)
    }

    async fn delete(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not delete draft note";

        let note_id = path_id(req, 0, "draft note id", MESSAGE)?;
        let iid = merge_iid(session, MESSAGE)?;

        let result = self
            .gitlab
            .delete_draft_note(session.project_id(), iid, note_id)
            .await;
        classify(result, req.route(), MESSAGE)?;
        Ok(Success::message("Draft note deleted"))
    }
}

#[async_trait]
impl Service for DraftNoteService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        match *req.method() {
            Method::GET => self.list(req, session).await,
            Method::POST => self.create(req, session).await,
            Method::PATCH => self.update(req, session).await,
            Method::DELETE => self.delete(req, session).await,
            _ => Err(unsupported(req)),
        }
    }
}

/// Publishes one draft or all of them.
pub struct DraftNotePublisherService {
    gitlab: Arc<dyn GitlabApi>,
}

impl DraftNotePublisherService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for DraftNotePublisherService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not publish draft note(s)";

        let payload = req.payload::<DraftNotePublishRequest>()?;
        let iid = merge_iid(session, MESSAGE)?;

        let result = match (payload.publish_all, payload.note) {
            (true, _) => self.gitlab.publish_all_draft_notes(session.project_id(), iid).await,
            (false, Some(note_id)) => {
                self.gitlab
                    .publish_draft_note(session.project_id(), iid, note_id)
                    .await
            }
            (false, None) => {
                return Err(Failure::bad_request(
                    MESSAGE,
                    "Must provide a draft note ID or set publish_all",
                ))
            }
        };
        classify(result, req.route(), MESSAGE)?;
        Ok(Success::message("Draft note(s) published"))
    }
}
