//! Sniffer Error Types

use capture::CaptureError;
use render::RenderError;
use ring_buffer::RingError;
use thiserror::Error;

/// Errors that stop the sniffer
#[derive(Debug, Error)]
pub enum SnifferError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Configuration loaded but is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Logging could not be initialised
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// The overflow buffer could not be created
    #[error(transparent)]
    Ring(#[from] RingError),

    /// The capture thread failed
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The render thread failed
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// Thread spawn or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline thread panicked
    #[error("{0} thread panicked")]
    ThreadPanic(&'static str),
}
