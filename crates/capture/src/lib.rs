//! Sample Capture
//!
//! Polls the hardware sample source and forwards every sample, in capture
//! order, to the handoff channel. When the channel is busy samples are
//! parked in the overflow ring buffer and drained ahead of anything newer.

mod capture_loop;
mod source;

pub use capture_loop::{CaptureConfig, CaptureLoop, CaptureStats, Step};
pub use source::{ReplaySource, SampleSource};

use handoff::HandoffError;
use thiserror::Error;

/// Capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The render side dropped its end of the channel
    #[error("Handoff channel closed by the consumer")]
    ChannelClosed,
}

impl From<HandoffError> for CaptureError {
    fn from(err: HandoffError) -> Self {
        match err {
            HandoffError::Closed => CaptureError::ChannelClosed,
        }
    }
}
