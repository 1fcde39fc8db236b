//! Hex text sample source for replaying recorded captures

use capture::SampleSource;
use i2c_protocol::Sample;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, warn};

/// Samples parsed ahead of the capture loop
const READ_AHEAD: usize = 1024;

/// Reads samples written as hex words, whitespace separated, `#` to end of line is a comment.
///
/// Lines are read on a dedicated `hex-reader` thread, so polling never
/// blocks the capture loop even when the input is an idle terminal.
pub struct HexLineSource {
    samples: mpsc::Receiver<Sample>,
    pending: Option<Sample>,
    finished: bool,
    rejected: Arc<AtomicU64>,
}

impl HexLineSource {
    /// Create a source and start the reader thread for `reader`
    pub fn new<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(READ_AHEAD);
        let rejected = Arc::new(AtomicU64::new(0));
        let reader_rejected = Arc::clone(&rejected);

        thread::Builder::new()
            .name("hex-reader".to_string())
            .spawn(move || read_samples(reader, tx, &reader_rejected))?;

        Ok(Self {
            samples: rx,
            pending: None,
            finished: false,
            rejected,
        })
    }

    /// Words that could not be parsed
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

fn read_samples<R: BufRead>(mut reader: R, tx: mpsc::Sender<Sample>, rejected: &AtomicU64) {
    let mut line = String::new();
    let mut line_no = 0usize;

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                debug!("End of sample input after {} lines", line_no);
                return;
            }
            Ok(_) => {
                line_no += 1;
                let content = line.split('#').next().unwrap_or_default();
                for word in content.split_whitespace() {
                    match parse_word(word) {
                        Some(sample) => {
                            if tx.blocking_send(sample).is_err() {
                                // Capture side is gone
                                return;
                            }
                        }
                        None => {
                            rejected.fetch_add(1, Ordering::Relaxed);
                            warn!("Line {}: skipping malformed sample {:?}", line_no, word);
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Sample input failed: {}", e);
                return;
            }
        }
    }
}

fn parse_word(word: &str) -> Option<Sample> {
    let digits = word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix("0X"))
        .unwrap_or(word);
    Sample::from_str_radix(digits, 16).ok()
}

impl SampleSource for HexLineSource {
    fn sample_available(&mut self) -> bool {
        if self.pending.is_none() && !self.finished {
            match self.samples.try_recv() {
                Ok(sample) => self.pending = Some(sample),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.finished = true,
            }
        }
        self.pending.is_some()
    }

    fn read_sample(&mut self) -> Sample {
        self.pending.take().unwrap_or_default()
    }

    fn is_finished(&self) -> bool {
        self.finished && self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn drain(source: &mut HexLineSource) -> Vec<Sample> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut samples = Vec::new();
        while !source.is_finished() && Instant::now() < deadline {
            match source.poll() {
                Some(sample) => samples.push(sample),
                None => thread::yield_now(),
            }
        }
        samples
    }

    #[test]
    fn test_parses_words_and_comments() {
        let input = "# capture\n0x000 87e\n\n0X400   # stop\n";
        let mut source = HexLineSource::new(Cursor::new(input)).unwrap();
        assert_eq!(drain(&mut source), vec![0x000, 0x87E, 0x400]);
        assert!(source.is_finished());
        assert_eq!(source.rejected(), 0);
    }

    #[test]
    fn test_skips_malformed_words() {
        let input = "800\nzz 0x1_0\n123456789\nC00\n";
        let mut source = HexLineSource::new(Cursor::new(input)).unwrap();
        assert_eq!(drain(&mut source), vec![0x800, 0xC00]);
        assert_eq!(source.rejected(), 3);
    }

    #[test]
    fn test_empty_input_is_finished() {
        let mut source = HexLineSource::new(Cursor::new("")).unwrap();
        assert!(drain(&mut source).is_empty());
        assert!(source.is_finished());
    }

    #[test]
    fn test_poll_does_not_wait_for_input() {
        // Reader that never yields a line while the sender is alive
        struct Idle(std::sync::mpsc::Receiver<()>);

        impl io::Read for Idle {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                let _ = self.0.recv();
                Ok(0)
            }
        }

        let (hold, idle) = std::sync::mpsc::channel();
        let mut source = HexLineSource::new(io::BufReader::new(Idle(idle))).unwrap();

        let started = Instant::now();
        assert!(!source.sample_available());
        assert!(!source.is_finished());
        assert!(started.elapsed() < Duration::from_millis(500));

        drop(hold);
        assert!(drain(&mut source).is_empty());
        assert!(source.is_finished());
    }
}
