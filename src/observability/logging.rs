//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Route log output to the log file given on the command line
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Stdout is reserved for the startup announcement, so logs never go there
//! - Log level configurable via `RUST_LOG`

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::BridgeConfig;

const DEFAULT_FILTER: &str = "gitlab_bridge=info,tower_http=info";

/// Install the global subscriber.
///
/// Falls back to stderr if the log file cannot be opened.
pub fn init(config: &BridgeConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let file = config.log_path.as_deref().map(|path| (path, open_log_file(path)));
    match file {
        Some((_, Ok(file))) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        Some((path, Err(e))) => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            tracing::warn!(path = %path.display(), error = %e, "Could not open log file, logging to stderr");
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
