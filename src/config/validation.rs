//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap handles presence of positional arguments)
//! - Reject empty project id, instance URL and token
//! - Check the instance URL parses as an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::BridgeConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Project ID cannot be empty")]
    EmptyProjectId,

    #[error("GitLab instance URL cannot be empty")]
    EmptyGitlabUrl,

    #[error("Invalid GitLab instance URL '{url}': {reason}")]
    InvalidGitlabUrl { url: String, reason: String },

    #[error("Auth token cannot be empty")]
    EmptyAuthToken,

    #[error("Readiness probe attempts must be at least 1")]
    NoProbeAttempts,
}

pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.project_id.trim().is_empty() {
        errors.push(ValidationError::EmptyProjectId);
    }

    if config.gitlab_url.trim().is_empty() {
        errors.push(ValidationError::EmptyGitlabUrl);
    } else if let Err(reason) = check_url(&config.gitlab_url) {
        errors.push(ValidationError::InvalidGitlabUrl {
            url: config.gitlab_url.clone(),
            reason,
        });
    }

    if config.auth_token.trim().is_empty() {
        errors.push(ValidationError::EmptyAuthToken);
    }

    if config.listener.probe_attempts == 0 {
        errors.push(ValidationError::NoProbeAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
