//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process arguments (positional)
//!     → schema.rs (clap `Cli`)
//!     → loader.rs (debug settings JSON, defaults)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the editor restarts the process to change it
//! - Listener tuning has defaults and is not exposed as arguments
//! - Validation separates syntactic (clap/serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BridgeConfig, Cli, DebugSettings, ListenerConfig};
