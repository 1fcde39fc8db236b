//! Sample Ring Buffer
//!
//! Fixed-capacity circular FIFO that absorbs bursts of captured samples
//! while the handoff channel is saturated. Owned by a single context; it
//! performs no synchronisation of its own.

mod buffer;

pub use buffer::{OverflowPolicy, Push, RingBuffer, DEFAULT_CAPACITY};

use thiserror::Error;

/// Ring buffer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Backing storage could not be allocated
    #[error("Failed to allocate ring buffer storage for {capacity} entries")]
    Allocation { capacity: usize },

    /// A ring buffer must hold at least one entry
    #[error("Ring buffer capacity must be non-zero")]
    ZeroCapacity,
}
