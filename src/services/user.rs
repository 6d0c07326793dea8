use std::sync::Arc;

use async_trait::async_trait;

use crate::gitlab::GitlabApi;
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

/// The user owning the auth token.
pub struct CurrentUserService {
    gitlab: Arc<dyn GitlabApi>,
}

impl CurrentUserService {
    pub fn new(gitlab: Arc<dyn GitlabApi>) -> Self {
        Self { gitlab }
    }
}

#[async_trait]
impl Service for CurrentUserService {
    async fn serve(&self, req: &RequestEnvelope, _session: &Session) -> Result<Success, Failure> {
        let user = classify(self.gitlab.current_user().await, req.route(), "Failed to get current user")?;
        Success::new("User fetched successfully", user)
    }
}
