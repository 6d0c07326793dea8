//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener on the configured host and port
//! - Probe `/ping` until the server answers
//! - Announce the bound port on stdout
//!
//! # Design Decisions
//! - Fail fast: a bind or probe failure is fatal
//! - The announcement is the only stdout output, so the editor can parse it
//! - Probes bypass any configured HTTP proxy

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read bound address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("Could not build probe client: {0}")]
    ProbeClient(#[from] reqwest::Error),

    #[error("Server did not answer /ping after {attempts} attempts")]
    NotReady { attempts: u32 },
}

/// Bind the listener. Port 0 asks the OS for a free port.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })
}

/// Poll `GET /ping` on `addr` until it succeeds or attempts run out.
pub async fn probe_ready(addr: SocketAddr, config: &ListenerConfig) -> Result<(), StartupError> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(config.probe_timeout_ms))
        .build()?;
    let url = format!("http://{}/ping", addr);
    let interval = Duration::from_millis(config.probe_interval_ms);

    for attempt in 1..=config.probe_attempts {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(attempt, "Readiness probe succeeded");
                return Ok(());
            }
            Ok(resp) => {
                tracing::debug!(attempt, status = resp.status().as_u16(), "Readiness probe rejected");
            }
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Readiness probe failed");
            }
        }
        if attempt < config.probe_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(StartupError::NotReady {
        attempts: config.probe_attempts,
    })
}

/// The line the editor parses to learn the port.
pub fn announcement(port: u16) -> String {
    format!("Server started on port:  {}", port)
}

/// Print the announcement on stdout and flush it.
pub fn announce(port: u16) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", announcement(port))?;
    stdout.flush()
}
