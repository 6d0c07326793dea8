//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → server.rs (Dispatcher: route → pipeline, middleware layers)
//!     → request.rs (RequestEnvelope: method, path, body, bound payload)
//!     → pipeline (validators, context, service)
//!     → envelope.rs (Success / Failure JSON)
//!     → Send to client
//! ```

pub mod envelope;
pub mod request;
pub mod server;

pub use envelope::{ApiResponse, Failure, Success};
pub use request::RequestEnvelope;
pub use server::{Dependencies, Dispatcher};
