//! Shutdown coordination for the bridge.

use std::sync::Arc;

use tokio::sync::watch;

/// Why the bridge is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `POST /shutdown` from the editor.
    Requested,
    /// `POST /shutdown` asking for a restart; the editor relaunches the process.
    Restart,
    /// SIGINT / SIGTERM.
    Signal,
}

/// Single-slot shutdown signal.
///
/// The first trigger wins; later triggers are ignored. Waiters that
/// subscribe after the trigger still observe it.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the shutdown signal. Returns `false` if it was already triggered.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            tracing::info!(reason = ?reason, "Shutdown requested");
        }
        first
    }

    /// The reason, if shutdown has been triggered.
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            // The sender lives as long as `self`, so this only fails if it is dropped.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
