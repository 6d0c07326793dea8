//! Local companion server between an editor extension and the GitLab API.

pub mod config;
pub mod git;
pub mod gitlab;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod services;
pub mod session;

pub use config::schema::BridgeConfig;
pub use http::{Dependencies, Dispatcher};
pub use lifecycle::{Lifecycle, Shutdown};
pub use session::Session;
