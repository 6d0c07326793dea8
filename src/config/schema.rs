//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! Everything except `listener` comes from the process arguments.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Positional process arguments, in the order the editor passes them.
#[derive(Debug, Clone, Parser)]
#[command(name = "gitlab-bridge")]
#[command(about = "Local companion server between an editor and the GitLab API", long_about = None)]
pub struct Cli {
    /// GitLab project id or `group/project` path.
    pub project_id: String,

    /// Base URL of the GitLab instance (e.g. https://gitlab.com).
    pub gitlab_url: String,

    /// Port to listen on; 0 picks a free port.
    pub port: u16,

    /// Personal access token.
    pub auth_token: String,

    /// JSON object with request/response logging flags.
    pub debug_settings: Option<String>,

    /// File receiving the log output.
    pub log_path: Option<PathBuf>,
}

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// GitLab project id or path.
    pub project_id: String,

    /// GitLab instance base URL, without `/api/v4`.
    pub gitlab_url: String,

    /// Personal access token.
    #[serde(skip_serializing)]
    pub auth_token: String,

    /// Upstream request/response logging.
    pub debug: DebugSettings,

    /// Log file; stderr when absent.
    pub log_path: Option<PathBuf>,

    /// Listener and lifecycle tuning.
    pub listener: ListenerConfig,
}

/// Upstream traffic logging switches.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DebugSettings {
    /// Log every outgoing GitLab request.
    #[serde(rename = "go_request", alias = "request")]
    pub request: bool,

    /// Log every GitLab response, body included.
    #[serde(rename = "go_response", alias = "response")]
    pub response: bool,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host; localhost only.
    pub host: String,

    /// Bind port (0 = ephemeral).
    pub port: u16,

    /// Readiness probe attempts before startup fails.
    pub probe_attempts: u32,

    /// Pause between readiness probe attempts, in milliseconds.
    pub probe_interval_ms: u64,

    /// Timeout of a single readiness probe, in milliseconds.
    pub probe_timeout_ms: u64,

    /// Upper bound on draining in-flight requests, in seconds.
    pub drain_timeout_secs: u64,

    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            probe_attempts: 10,
            probe_interval_ms: 50,
            probe_timeout_ms: 500,
            drain_timeout_secs: 5,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}
