//! I2C Bus Sniffer
//!
//! Wires the capture loop and the render loop onto two OS threads joined
//! by a bounded handoff mailbox, with configuration and logging for the
//! hosted binary.

pub mod config;
mod error;
mod pipeline;
mod source;

pub use crate::config::SnifferConfig;
pub use error::SnifferError;
pub use pipeline::{Pipeline, PipelineHandle, PipelineReport};
pub use source::HexLineSource;

use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr; stdout is reserved for the token stream.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) -> Result<(), SnifferError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| SnifferError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| SnifferError::Logging(e.to_string()))
}
