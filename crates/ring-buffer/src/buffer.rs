//! Ring Buffer Implementation

use crate::RingError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default buffer capacity (10000 samples)
pub const DEFAULT_CAPACITY: usize = 10_000;

/// What happens when a sample is pushed into a full buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Reject the incoming sample, keep everything already buffered
    #[default]
    DropNewest,
    /// Evict the oldest unread sample to make room
    DropOldest,
}

/// Outcome of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Push<T> {
    /// The sample was stored
    Stored,
    /// The buffer was full; this sample was lost
    Dropped(T),
}

impl<T> Push<T> {
    /// Whether a sample was lost
    pub fn is_dropped(&self) -> bool {
        matches!(self, Push::Dropped(_))
    }
}

/// Single-owner circular FIFO
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[T]>,
    /// Next slot to write
    write_index: usize,
    /// Next slot to read
    read_index: usize,
    /// Unread entries
    len: usize,
    /// Overflow handling
    policy: OverflowPolicy,
    /// Total samples stored (for statistics)
    total_written: u64,
    /// Samples lost to overflow
    dropped: u64,
    /// Largest backlog seen
    high_water_mark: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Allocate a ring buffer holding up to `capacity` unread entries
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }

        let mut storage: Vec<T> = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| RingError::Allocation { capacity })?;
        storage.resize(capacity, T::default());

        debug!("Allocated ring buffer: {} entries, {:?}", capacity, policy);

        Ok(Self {
            storage: storage.into_boxed_slice(),
            write_index: 0,
            read_index: 0,
            len: 0,
            policy,
            total_written: 0,
            dropped: 0,
            high_water_mark: 0,
        })
    }

    /// Create a buffer with default capacity (10000 samples)
    pub fn with_default_capacity() -> Result<Self, RingError> {
        Self::new(DEFAULT_CAPACITY, OverflowPolicy::default())
    }

    /// Append a sample at the tail
    pub fn push(&mut self, sample: T) -> Push<T> {
        if self.is_full() {
            self.dropped += 1;
            match self.policy {
                OverflowPolicy::DropNewest => return Push::Dropped(sample),
                OverflowPolicy::DropOldest => {
                    // Full implies non-empty.
                    let evicted = self.storage[self.read_index];
                    self.read_index = self.advance(self.read_index);
                    self.len -= 1;
                    self.store(sample);
                    return Push::Dropped(evicted);
                }
            }
        }

        self.store(sample);
        Push::Stored
    }

    /// Remove and return the oldest unread sample
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let sample = self.storage[self.read_index];
        self.read_index = self.advance(self.read_index);
        self.len -= 1;
        Some(sample)
    }

    /// Look at the oldest unread sample without removing it
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.storage[self.read_index])
        }
    }

    fn store(&mut self, sample: T) {
        self.storage[self.write_index] = sample;
        self.write_index = self.advance(self.write_index);
        self.len += 1;
        self.total_written += 1;
        self.high_water_mark = self.high_water_mark.max(self.len);
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.storage.len() {
            0
        } else {
            next
        }
    }
}

impl<T> RingBuffer<T> {
    /// Get the number of unread samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get the overflow policy
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len as f64 / self.storage.len() as f64
    }

    /// Get total samples stored (for statistics)
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Get the number of samples lost to overflow
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Get the largest backlog held at once
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Discard all unread samples
    pub fn clear(&mut self) {
        self.read_index = self.write_index;
        self.len = 0;
    }
}
