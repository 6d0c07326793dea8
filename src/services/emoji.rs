use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::gitlab::GitlabApi;
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::{classify, merge_iid, path_id, unsupported};
use crate::session::Session;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EmojiRequest {
    pub emoji: String,
}

/// Award emoji on merge request notes.
///
/// `POST /mr/awardable/note/<note_id>` adds, `DELETE .../<note_id>/<award_id>` removes.
pub struct EmojiService {
    gitlab: Arc<dyn GitlabApi>,
}

impl EmojiService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }

    async fn add(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not add emoji";

        let note_id = path_id(req, 0, "note id", MESSAGE)?;
        let payload = req.payload::<EmojiRequest>()?;
        if payload.emoji.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "Emoji name cannot be empty"));
        }
        let iid = merge_iid(session, MESSAGE)?;

        let result = self
            .gitlab
            .create_note_award_emoji(session.project_id(), iid, note_id, &payload.emoji)
            .await;
        let award = classify(result, req.route(), MESSAGE)?;
        Success::new("Emoji added", award)
    }

    async fn remove(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        const MESSAGE: &str = "Could not delete emoji";

        let note_id = path_id(req, 0, "note id", MESSAGE)?;
        let award_id = path_id(req, 1, "award id", MESSAGE)?;
        let iid = merge_iid(session, MESSAGE)?;

        let result = self
            .gitlab
            .delete_note_award_emoji(session.project_id(), iid, note_id, award_id)
            .await;
        classify(result, req.route(), MESSAGE)?;
        Ok(Success::message("Emoji deleted"))
    }
}

#[async_trait]
impl Service for EmojiService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        match *req.method() {
            Method::POST => self.add(req, session).await,
            Method::DELETE => self.remove(req, session).await,
            _ => Err(unsupported(req)),
        }
    }
}
