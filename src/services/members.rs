use std::sync::Arc;

use async_trait::async_trait;

use crate::gitlab::GitlabApi;
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

/// Lists everyone with access to the project (used for reviewer/assignee pickers).
pub struct ProjectMembersService {
    gitlab: Arc<dyn GitlabApi>,
}

impl ProjectMembersService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for ProjectMembersService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        let result = self.gitlab.list_project_members(session.project_id()).await;
        let members = classify(result, req.route(), "Failed to retrieve project members")?;
        Success::new("Project members retrieved", members)
    }
}
