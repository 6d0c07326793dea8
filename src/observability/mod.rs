//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, to the log file)
//!     → metrics.rs (counters, histograms)
//!
//! tower-http TraceLayer adds a span per request; x-request-id is echoed back.
//! ```

pub mod logging;
pub mod metrics;
