//! Capture Loop Implementation

use crate::source::SampleSource;
use crate::CaptureError;
use handoff::{HandoffSender, Shutdown};
use i2c_protocol::Sample;
use ring_buffer::{Push, RingBuffer};
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, info, warn};

/// Configuration for the capture loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Flush the backlog with blocking sends when shutdown is requested
    pub drain_on_shutdown: bool,
    /// Yield the thread on iterations that moved nothing
    pub idle_yield: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            drain_on_shutdown: true,
            idle_yield: true,
        }
    }
}

/// What a single iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing captured, nothing sent
    Idle,
    /// A fresh sample went straight to the channel
    SentDirect,
    /// The oldest buffered sample was sent (any fresh sample was buffered behind it)
    SentFromBuffer,
    /// The channel was busy and the fresh sample was buffered
    Buffered,
    /// The channel was busy and the backlog was full; a sample was lost
    Dropped,
}

/// Counters for the capture loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Samples read from the source
    pub captured: u64,
    /// Samples sent without touching the backlog
    pub sent_direct: u64,
    /// Samples sent out of the backlog
    pub sent_from_buffer: u64,
    /// Samples parked in the backlog
    pub buffered: u64,
    /// Samples lost to backlog overflow
    pub dropped: u64,
    /// Largest backlog seen
    pub peak_backlog: usize,
}

impl CaptureStats {
    /// Total samples handed to the channel
    pub fn sent(&self) -> u64 {
        self.sent_direct + self.sent_from_buffer
    }
}

/// Forwards samples from a source to a handoff channel in capture order
pub struct CaptureLoop<S, H> {
    source: S,
    channel: H,
    backlog: RingBuffer<Sample>,
    config: CaptureConfig,
    stats: CaptureStats,
}

impl<S, H> CaptureLoop<S, H>
where
    S: SampleSource,
    H: HandoffSender<Sample>,
{
    /// Create a capture loop around an already-allocated backlog
    pub fn new(source: S, channel: H, backlog: RingBuffer<Sample>, config: CaptureConfig) -> Self {
        info!(
            "Capture loop created: backlog {} samples ({:?})",
            backlog.capacity(),
            backlog.policy()
        );

        Self {
            source,
            channel,
            backlog,
            config,
            stats: CaptureStats::default(),
        }
    }

    /// Run one poll iteration
    pub fn step(&mut self) -> Result<Step, CaptureError> {
        let fresh = self.source.poll();
        if fresh.is_some() {
            self.stats.captured += 1;
        }

        if !self.channel.has_room() {
            return Ok(match fresh {
                Some(sample) => self.park(sample),
                None => Step::Idle,
            });
        }

        // Anything already buffered is older than `fresh` and must go first.
        // Popping before parking means a full backlog still has room here.
        if let Some(oldest) = self.backlog.pop() {
            if let Some(sample) = fresh {
                self.park(sample);
            }
            self.channel.send(oldest)?;
            self.stats.sent_from_buffer += 1;
            return Ok(Step::SentFromBuffer);
        }

        match fresh {
            Some(sample) => {
                self.channel.send(sample)?;
                self.stats.sent_direct += 1;
                Ok(Step::SentDirect)
            }
            None => Ok(Step::Idle),
        }
    }

    /// Poll until shutdown is requested or the source is exhausted and the backlog is empty
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<CaptureStats, CaptureError> {
        info!("Starting capture loop");

        while !shutdown.is_requested() {
            if self.step()? == Step::Idle {
                if self.source.is_finished() && self.backlog.is_empty() {
                    info!("Sample source finished");
                    break;
                }
                if self.config.idle_yield {
                    thread::yield_now();
                }
            }
        }

        if shutdown.is_requested() {
            if self.config.drain_on_shutdown {
                self.drain()?;
            } else if !self.backlog.is_empty() {
                warn!("Discarding {} buffered samples on shutdown", self.backlog.len());
                self.backlog.clear();
            }
        }

        info!(
            "Capture loop stopped: captured={} sent={} dropped={} peak_backlog={}",
            self.stats.captured,
            self.stats.sent(),
            self.stats.dropped,
            self.stats.peak_backlog
        );
        Ok(self.stats.clone())
    }

    /// Send every buffered sample, blocking on the channel as needed
    pub fn drain(&mut self) -> Result<(), CaptureError> {
        if !self.backlog.is_empty() {
            debug!("Draining {} buffered samples", self.backlog.len());
        }
        while let Some(sample) = self.backlog.pop() {
            self.channel.send(sample)?;
            self.stats.sent_from_buffer += 1;
        }
        Ok(())
    }

    fn park(&mut self, sample: Sample) -> Step {
        match self.backlog.push(sample) {
            Push::Stored => {
                self.stats.buffered += 1;
                self.stats.peak_backlog = self.stats.peak_backlog.max(self.backlog.len());
                Step::Buffered
            }
            Push::Dropped(lost) => {
                self.stats.dropped += 1;
                if self.stats.dropped.is_power_of_two() {
                    warn!(
                        "Backlog full ({} samples), lost sample {:#x}; {} dropped so far",
                        self.backlog.capacity(),
                        lost,
                        self.stats.dropped
                    );
                }
                Step::Dropped
            }
        }
    }

    /// Get the counters
    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Samples currently waiting in the backlog
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    #[cfg(test)]
    pub(crate) fn channel(&self) -> &H {
        &self.channel
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }
}
