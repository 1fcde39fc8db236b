//! Render Loop Implementation

use crate::clock::Clock;
use crate::sink::TokenSink;
use crate::RenderError;
use handoff::{HandoffError, HandoffReceiver, Shutdown};
use i2c_protocol::{Event, RawFields, Sample, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How samples are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Compact bus tokens (`s`, `3Fa`, `o\r\n`, ...)
    #[default]
    Tokens,
    /// One diagnostic line per sample with every field
    Raw,
}

/// Render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Compact tokens or raw diagnostic lines
    pub mode: RenderMode,
    /// Prefix START tokens with the microsecond counter
    pub timestamps: bool,
    /// Flush the sink after each record boundary
    pub flush_each_record: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Tokens,
            timestamps: true,
            flush_each_record: true,
        }
    }
}

/// Counters for the render loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Samples rendered
    pub events: u64,
    /// START conditions
    pub starts: u64,
    /// STOP conditions (completed records)
    pub stops: u64,
    /// Data bytes
    pub data_bytes: u64,
    /// Data bytes that were not acknowledged
    pub nacks: u64,
    /// Samples with the reserved event code
    pub unknown: u64,
}

impl RenderStats {
    fn record(&mut self, event: &Event) {
        self.events += 1;
        match event {
            Event::Start => self.starts += 1,
            Event::Stop => self.stops += 1,
            Event::Data { ack, .. } => {
                self.data_bytes += 1;
                if !ack {
                    self.nacks += 1;
                }
            }
            Event::Unknown => self.unknown += 1,
        }
    }
}

/// Receives samples, decodes them and writes tokens
pub struct RenderLoop<R, C, W> {
    channel: R,
    clock: C,
    sink: W,
    config: RenderConfig,
    stats: RenderStats,
}

impl<R, C, W> RenderLoop<R, C, W>
where
    R: HandoffReceiver<Sample>,
    C: Clock,
    W: TokenSink,
{
    /// Create a render loop reading from `channel` and writing to `sink`
    pub fn new(channel: R, clock: C, sink: W, config: RenderConfig) -> Self {
        Self {
            channel,
            clock,
            sink,
            config,
            stats: RenderStats::default(),
        }
    }

    /// Decode one sample and write its token
    pub fn render(&mut self, sample: Sample) -> Result<Token, RenderError> {
        let event = Event::decode(sample);
        self.stats.record(&event);

        let token = match self.config.mode {
            RenderMode::Raw => Token::Raw(RawFields::from_sample(sample)),
            RenderMode::Tokens => {
                let timestamp_us = match event {
                    Event::Start if self.config.timestamps => Some(self.clock.now_us()),
                    _ => None,
                };
                Token::from_event(event, timestamp_us)
            }
        };

        self.sink.emit(&token)?;
        if self.config.flush_each_record && matches!(token, Token::Stop | Token::Raw(_)) {
            self.sink.flush_tokens()?;
        }
        Ok(token)
    }

    /// Block for the next sample and render it. Returns `None` once the producer is gone.
    pub fn step(&mut self) -> Result<Option<Token>, RenderError> {
        match self.channel.receive() {
            Ok(sample) => self.render(sample).map(Some),
            Err(HandoffError::Closed) => Ok(None),
        }
    }

    /// Render until the producer drops its end of the channel
    pub fn run(&mut self) -> Result<RenderStats, RenderError> {
        info!("Starting render loop ({:?})", self.config.mode);
        while self.step()?.is_some() {}
        self.finish()
    }

    /// Render until shutdown is requested or the channel closes.
    ///
    /// The signal is checked between samples; samples already waiting in the
    /// channel are rendered before returning.
    pub fn run_until(&mut self, shutdown: &Shutdown) -> Result<RenderStats, RenderError> {
        info!("Starting render loop ({:?})", self.config.mode);
        while !shutdown.is_requested() {
            if self.step()?.is_none() {
                return self.finish();
            }
        }

        while let Ok(Some(sample)) = self.channel.try_receive() {
            self.render(sample)?;
        }
        self.finish()
    }

    fn finish(&mut self) -> Result<RenderStats, RenderError> {
        self.sink.flush_tokens()?;
        info!(
            "Render loop stopped: events={} records={} data={} nacks={} unknown={}",
            self.stats.events,
            self.stats.stops,
            self.stats.data_bytes,
            self.stats.nacks,
            self.stats.unknown
        );
        if self.stats.unknown > 0 {
            debug!("{} samples carried the reserved event code", self.stats.unknown);
        }
        Ok(self.stats.clone())
    }

    /// Get the counters
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Get the output sink
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Consume the loop and return the sink
    pub fn into_sink(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use handoff::{mailbox, HandoffSender};
    use std::thread;

    fn word(code: u32, payload: u32, ack_raw: u32) -> Sample {
        (code << 10) | (payload << 1) | ack_raw
    }

    fn render_all(samples: &[Sample], config: RenderConfig) -> (String, RenderStats) {
        let (tx, rx) = mailbox(samples.len().max(1));
        for &sample in samples {
            tx.send(sample).unwrap();
        }
        drop(tx);

        let mut render = RenderLoop::new(rx, ManualClock::new(1500).with_step(250), Vec::new(), config);
        let stats = render.run().unwrap();
        (String::from_utf8(render.into_sink()).unwrap(), stats)
    }

    #[test]
    fn test_token_mapping() {
        let cases = [
            (word(0b00, 0, 0), "0000001500s"),
            (word(0b01, 0, 0), "o\r\n"),
            (word(0b10, 0x3F, 0), "3Fa"),
            (word(0b10, 0x3F, 1), "3Fn"),
            (word(0b11, 0, 0), "u"),
        ];

        for (sample, expected) in cases {
            let (output, _) = render_all(&[sample], RenderConfig::default());
            assert_eq!(output, expected, "sample {:#x}", sample);
        }
    }

    #[test]
    fn test_transaction_stream() {
        let transaction = [
            Event::Start,
            Event::Data { value: 0xA0, ack: true },
            Event::Data { value: 0x10, ack: true },
            Event::Data { value: 0xFF, ack: false },
            Event::Stop,
            Event::Start,
            Event::Unknown,
            Event::Stop,
        ];
        let samples: Vec<Sample> = transaction.iter().map(Event::encode).collect();

        let (output, stats) = render_all(&samples, RenderConfig::default());
        assert_eq!(output, "0000001500sA0a10aFFno\r\n0000001750suo\r\n");
        assert_eq!(stats.events, 8);
        assert_eq!(stats.starts, 2);
        assert_eq!(stats.stops, 2);
        assert_eq!(stats.data_bytes, 3);
        assert_eq!(stats.nacks, 1);
        assert_eq!(stats.unknown, 1);
    }

    #[test]
    fn test_without_timestamps() {
        let config = RenderConfig {
            timestamps: false,
            ..Default::default()
        };
        let samples = [word(0b00, 0, 0), word(0b10, 0x42, 0), word(0b01, 0, 0)];
        let (output, _) = render_all(&samples, config);
        assert_eq!(output, "s42ao\r\n");
    }

    #[test]
    fn test_raw_mode() {
        let config = RenderConfig {
            mode: RenderMode::Raw,
            ..Default::default()
        };
        let (output, stats) = render_all(&[word(0b10, 0x3F, 1)], config);
        assert_eq!(output, "val: 87f, ev_code: 2, data:3f, ack: 0 \r\n");
        assert_eq!(stats.nacks, 1);
    }

    #[test]
    fn test_step_reports_closed_channel() {
        let (tx, rx) = mailbox::<Sample>(1);
        let mut render = RenderLoop::new(rx, ManualClock::new(0), Vec::new(), RenderConfig::default());

        tx.send(word(0b01, 0, 0)).unwrap();
        assert_eq!(render.step().unwrap(), Some(Token::Stop));

        drop(tx);
        assert_eq!(render.step().unwrap(), None);
    }

    #[test]
    fn test_run_until_renders_pending_after_shutdown() {
        let (tx, rx) = mailbox::<Sample>(4);
        for _ in 0..3 {
            tx.send(word(0b11, 0, 0)).unwrap();
        }

        let shutdown = Shutdown::new();
        shutdown.request();
        let mut render = RenderLoop::new(rx, ManualClock::new(0), Vec::new(), RenderConfig::default());
        let stats = render.run_until(&shutdown).unwrap();

        assert_eq!(stats.unknown, 3);
        assert_eq!(render.sink().as_slice(), b"uuu");
        drop(tx);
    }

    #[test]
    fn test_blocks_until_producer_sends() {
        let (tx, rx) = mailbox::<Sample>(1);

        let producer = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(20));
            tx.send(word(0b10, 0x01, 0)).unwrap();
            tx.send(word(0b01, 0, 0)).unwrap();
        });

        let mut render = RenderLoop::new(rx, ManualClock::new(0), Vec::new(), RenderConfig::default());
        render.run().unwrap();
        producer.join().unwrap();

        assert_eq!(render.into_sink(), b"01ao\r\n".to_vec());
    }
}
