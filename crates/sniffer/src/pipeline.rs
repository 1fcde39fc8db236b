//! Capture/render pipeline on two OS threads

use crate::config::SnifferConfig;
use crate::SnifferError;
use capture::{CaptureError, CaptureLoop, CaptureStats, SampleSource};
use handoff::{mailbox, Shutdown};
use i2c_protocol::Sample;
use render::{Clock, RenderError, RenderLoop, RenderStats, TokenSink};
use ring_buffer::RingBuffer;
use serde::Serialize;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Final counters from both threads
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Counters from the capture thread
    pub capture: CaptureStats,
    /// Counters from the render thread
    pub render: RenderStats,
}

/// Validated pipeline, ready to spawn
pub struct Pipeline {
    config: SnifferConfig,
}

impl Pipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: SnifferConfig) -> Result<Self, SnifferError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Allocate the backlog and start the capture and render threads.
    ///
    /// Allocation failure is reported here, before either thread exists.
    pub fn spawn<S, C, W>(
        self,
        source: S,
        clock: C,
        sink: W,
        shutdown: Shutdown,
    ) -> Result<PipelineHandle, SnifferError>
    where
        S: SampleSource + Send + 'static,
        C: Clock + Send + 'static,
        W: TokenSink + Send + 'static,
    {
        let backlog: RingBuffer<Sample> =
            RingBuffer::new(self.config.buffer.capacity, self.config.buffer.overflow)?;
        let (tx, rx) = mailbox(self.config.channel.capacity);

        let mut render = RenderLoop::new(rx, clock, sink, self.config.render);
        let render_thread = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || render.run())?;

        let mut capture = CaptureLoop::new(source, tx, backlog, self.config.capture);
        let capture_shutdown = shutdown.clone();
        let capture_thread = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || capture.run(&capture_shutdown))?;

        info!(
            "Pipeline running: backlog {} samples, mailbox {} slot(s)",
            self.config.buffer.capacity, self.config.channel.capacity
        );

        Ok(PipelineHandle {
            shutdown,
            capture: capture_thread,
            render: render_thread,
        })
    }
}

/// Running pipeline
pub struct PipelineHandle {
    shutdown: Shutdown,
    capture: JoinHandle<Result<CaptureStats, CaptureError>>,
    render: JoinHandle<Result<RenderStats, RenderError>>,
}

impl PipelineHandle {
    /// Ask the capture thread to stop; the render thread follows once the channel closes
    pub fn shutdown(&self) {
        self.shutdown.request();
    }

    /// Whether both threads have exited
    pub fn is_finished(&self) -> bool {
        self.capture.is_finished() && self.render.is_finished()
    }

    /// Wait for both threads.
    ///
    /// A render failure closes the channel and makes capture fail as well, so
    /// the render error is reported first.
    pub fn join(self) -> Result<PipelineReport, SnifferError> {
        let capture = self
            .capture
            .join()
            .map_err(|_| SnifferError::ThreadPanic("capture"))?;
        let render = self
            .render
            .join()
            .map_err(|_| SnifferError::ThreadPanic("render"))?;

        let render = render.inspect_err(|e| error!("Render thread failed: {}", e))?;
        let capture = capture.inspect_err(|e| error!("Capture thread failed: {}", e))?;

        Ok(PipelineReport { capture, render })
    }
}
