use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};
use crate::pipeline::Service;
use crate::session::Session;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownRequest {
    pub restart: bool,
}

/// Starts draining the server. The response is still delivered; the
/// listener closes once in-flight requests finish.
pub struct ShutdownService {
    shutdown: Shutdown,
}

impl ShutdownService {
    pub fn new(shutdown: Shutdown) -> Self {
        Self { shutdown }
    }
}

#[async_trait]
impl Service for ShutdownService {
    async fn serve(&self, req: &RequestEnvelope, _session: &Session) -> Result<Success, Failure> {
        let payload = req.payload::<ShutdownRequest>()?;
        let (reason, message) = if payload.restart {
            (ShutdownReason::Restart, "Restarting server")
        } else {
            (ShutdownReason::Requested, "Shutting down server")
        };

        self.shutdown.trigger(reason);
        Ok(Success::message(message))
    }
}
