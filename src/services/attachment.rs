//! Uploads a local file to the project so it can be linked from comments.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gitlab::GitlabApi;
use crate::http::envelope::{Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::pipeline::Service;
use crate::services::classify;
use crate::session::Session;

const MESSAGE: &str = "Could not upload file";

/// Source of attachment contents.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads attachments from local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileReader;

#[async_trait]
impl FileReader for DiskFileReader {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AttachmentRequest {
    pub file_path: String,
    pub file_name: String,
}

pub struct AttachmentService {
    gitlab: Arc<dyn GitlabApi>,
    files: Arc<dyn FileReader>,
}

impl AttachmentService {
    pub fn new(gitlab: Arc<dyn GitlabApi>, files: Arc<dyn FileReader>) -> Self {
        Self { gitlab, files }
    }
}

#[async_trait]
impl Service for AttachmentService {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure> {
        let payload = req.payload::<AttachmentRequest>()?;
        if payload.file_path.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "File path cannot be empty"));
        }
        if payload.file_name.is_empty() {
            return Err(Failure::bad_request(MESSAGE, "File name cannot be empty"));
        }

        let contents = self
            .files
            .read(Path::new(&payload.file_path))
            .await
            .map_err(|e| {
                Failure::bad_request(
                    "Could not read file",
                    format!("Could not read {}: {}", payload.file_path, e),
                )
            })?;

        tracing::debug!(file = %payload.file_path, bytes = contents.len(), "Uploading attachment");
        let result = self
            .gitlab
            .upload_file(session.project_id(), &payload.file_name, contents)
            .await;
        let file = classify(result, req.route(), MESSAGE)?;
        Success::new("File uploaded successfully", file)
    }
}
