//! GitLab bridge
//!
//! Launched by the editor extension with positional arguments, serves a
//! small JSON API on localhost and forwards calls to the GitLab REST API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Editor                ┌──────────────────────────────────────────────┐
//!     ─────────────────────▶│ http::Dispatcher (route → pipeline)          │
//!                           │   MethodValidator → PayloadValidator         │
//!                           │   → MergeRequestResolver → Service           │
//!     ◀─────────────────────│   → Success / Failure envelope               │
//!                           └──────────────────────┬───────────────────────┘
//!                                                  │ gitlab::GitlabApi
//!                                                  ▼
//!                                           GitLab REST API
//! ```
//!
//! Stdout carries exactly one line, the port announcement; logs go to the
//! log file given on the command line.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use gitlab_bridge::config::{load_config, Cli};
use gitlab_bridge::git;
use gitlab_bridge::gitlab::GitlabClient;
use gitlab_bridge::lifecycle::signals::spawn_signal_listener;
use gitlab_bridge::observability::logging;
use gitlab_bridge::services::DiskFileReader;
use gitlab_bridge::{Dependencies, Dispatcher, Lifecycle, Session, Shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        project_id = %config.project_id,
        gitlab_url = %config.gitlab_url,
        "gitlab-bridge starting"
    );

    let branch = match std::env::current_dir()
        .map_err(git::GitError::from)
        .and_then(|dir| git::current_branch(&dir))
    {
        Ok(branch) => branch,
        Err(e) => {
            tracing::error!(error = %e, "Could not determine current branch");
            eprintln!("Could not determine current branch: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let gitlab = match GitlabClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Could not create GitLab client");
            eprintln!("Could not create GitLab client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let session = Session::new(&config.project_id, &branch, &config.gitlab_url);
    tracing::info!(branch = %session.branch(), "Session established");

    let router = Dispatcher::new(Dependencies {
        session: Arc::new(session),
        gitlab: Arc::new(gitlab),
        files: Arc::new(DiskFileReader),
        shutdown: shutdown.clone(),
    })
    .body_limit(config.listener.body_limit_bytes)
    .into_router();

    match Lifecycle::new(config.listener, shutdown).run(router).await {
        Ok(reason) => {
            tracing::info!(reason = ?reason, "Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            eprintln!("Server failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
