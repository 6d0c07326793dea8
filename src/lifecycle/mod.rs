//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind → Serve → Probe /ping → Announce port
//!
//! Shutdown (shutdown.rs):
//!     POST /shutdown or signal → Stop accepting → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - States only move forward: Initializing → Listening → Draining → Stopped
//! - The port is announced only after the readiness probe passes
//! - Draining has a deadline; the server task is aborted after it

pub mod shutdown;
pub mod signals;
pub mod startup;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ListenerConfig;

pub use shutdown::{Shutdown, ShutdownReason};
pub use startup::StartupError;

/// Where the server is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    Listening,
    Draining,
    Stopped,
}

/// Error type for a running server.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("Could not announce port: {0}")]
    Announce(#[source] std::io::Error),

    #[error("Server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Server stopped without a shutdown request")]
    UnexpectedExit,
}

type ServeTask = JoinHandle<std::io::Result<()>>;

/// Drives one server from bind to exit.
pub struct Lifecycle {
    config: ListenerConfig,
    shutdown: Shutdown,
    state: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub fn new(config: ListenerConfig, shutdown: Shutdown) -> Self {
        let (state, _) = watch::channel(LifecycleState::Initializing);
        Self {
            config,
            shutdown,
            state,
        }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Bind, start serving, and wait for the readiness probe.
    pub async fn start(self, router: Router) -> Result<RunningServer, StartupError> {
        let listener = startup::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(StartupError::LocalAddr)?;

        let signal = self.shutdown.clone();
        let serve: ServeTask = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    signal.wait().await;
                })
                .await
        });

        if let Err(e) = startup::probe_ready(addr, &self.config).await {
            serve.abort();
            self.state.send_replace(LifecycleState::Stopped);
            return Err(e);
        }

        self.state.send_replace(LifecycleState::Listening);
        tracing::info!(address = %addr, "Listening for connections");

        Ok(RunningServer {
            addr,
            serve,
            shutdown: self.shutdown,
            state: self.state,
            drain_timeout: Duration::from_secs(self.config.drain_timeout_secs),
        })
    }

    /// Start, announce the port, and run until shutdown completes.
    pub async fn run(self, router: Router) -> Result<ShutdownReason, LifecycleError> {
        let server = self.start(router).await?;
        server.announce()?;
        server.wait().await
    }
}

/// A server that passed its readiness probe.
pub struct RunningServer {
    addr: SocketAddr,
    serve: ServeTask,
    shutdown: Shutdown,
    state: watch::Sender<LifecycleState>,
    drain_timeout: Duration,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Print the port announcement on stdout.
    pub fn announce(&self) -> Result<(), LifecycleError> {
        startup::announce(self.port()).map_err(LifecycleError::Announce)
    }

    /// Wait for shutdown, then drain in-flight requests.
    pub async fn wait(self) -> Result<ShutdownReason, LifecycleError> {
        let RunningServer {
            mut serve,
            shutdown,
            state,
            drain_timeout,
            ..
        } = self;

        let reason = tokio::select! {
            reason = shutdown.wait() => reason,
            result = &mut serve => {
                state.send_replace(LifecycleState::Stopped);
                result?.map_err(LifecycleError::Serve)?;
                return shutdown.reason().ok_or(LifecycleError::UnexpectedExit);
            }
        };

        state.send_replace(LifecycleState::Draining);
        tracing::info!(reason = ?reason, "Draining in-flight requests");

        let drained = tokio::time::timeout(drain_timeout, &mut serve).await;
        state.send_replace(LifecycleState::Stopped);
        match drained {
            Ok(result) => result?.map_err(LifecycleError::Serve)?,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "Drain deadline passed, dropping remaining connections"
                );
                serve.abort();
            }
        }

        tracing::info!("Server stopped");
        Ok(reason)
    }
}
