//! Sample Source Boundary

use i2c_protocol::Sample;
use std::collections::VecDeque;

/// Producer of raw samples (the bus capture hardware in production)
pub trait SampleSource {
    /// Non-blocking check for a pending sample
    fn sample_available(&mut self) -> bool;

    /// Read the pending sample. Only valid right after `sample_available()` returned true.
    fn read_sample(&mut self) -> Sample;

    /// Whether the source will never produce another sample
    fn is_finished(&self) -> bool {
        false
    }

    /// Read a sample if one is pending
    fn poll(&mut self) -> Option<Sample> {
        if self.sample_available() {
            Some(self.read_sample())
        } else {
            None
        }
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn sample_available(&mut self) -> bool {
        (**self).sample_available()
    }

    fn read_sample(&mut self) -> Sample {
        (**self).read_sample()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

/// In-memory source that replays a fixed list of samples
///
/// An optional availability pattern, cycled per poll, lets tests model a
/// source that only produces on some iterations.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    samples: VecDeque<Sample>,
    pattern: Vec<bool>,
    polls: usize,
}

impl ReplaySource {
    /// Replay `samples`, one per poll
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            pattern: Vec::new(),
            polls: 0,
        }
    }

    /// Only produce on polls where the cycled pattern is `true`
    pub fn with_pattern(mut self, pattern: Vec<bool>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Samples not yet read
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for ReplaySource {
    fn sample_available(&mut self) -> bool {
        let slot = self.polls;
        self.polls += 1;
        let enabled = self.pattern.is_empty() || self.pattern[slot % self.pattern.len()];
        enabled && !self.samples.is_empty()
    }

    fn read_sample(&mut self) -> Sample {
        self.samples.pop_front().unwrap_or_default()
    }

    fn is_finished(&self) -> bool {
        self.samples.is_empty()
    }
}
