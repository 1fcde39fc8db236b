//! Sample Rendering
//!
//! Blocks on the handoff channel, decodes every sample and writes its
//! token to an output sink. Each sample is decoded independently.

mod clock;
mod render_loop;
mod sink;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use render_loop::{RenderConfig, RenderLoop, RenderMode, RenderStats};
pub use sink::TokenSink;

use thiserror::Error;

/// Render errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the output sink failed
    #[error("Output sink error: {0}")]
    Sink(#[from] std::io::Error),
}
