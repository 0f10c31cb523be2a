//! Configuration for the jirax webhook receiver.
//!
//! Settings live in `.jirax/config.yml` under a working directory:
//! - `decode.strictness`: How unknown event types and extra fields are treated
//! - `server.host`, `server.port`: Where the receiver listens

pub mod config;
pub mod error;

pub use config::{DecodeSettings, ReceiverConfig, ServerSettings};
pub use error::{ConfigError, Result};
