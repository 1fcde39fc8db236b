//! Sniffer Configuration
//!
//! Built-in defaults, then an optional TOML file, then `SNIFFER_*`
//! environment variables (`__` separates sections, e.g.
//! `SNIFFER_BUFFER__CAPACITY=512`). Fixed once the pipeline starts.

use crate::SnifferError;
use ::config::{Config, Environment, File};
use capture::CaptureConfig;
use render::RenderConfig;
use ring_buffer::{OverflowPolicy, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SNIFFER";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnifferConfig {
    /// Overflow backlog
    pub buffer: BufferConfig,
    /// Handoff mailbox
    pub channel: ChannelConfig,
    /// Capture loop
    pub capture: CaptureConfig,
    /// Render loop
    pub render: RenderConfig,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            buffer: BufferConfig::default(),
            channel: ChannelConfig::default(),
            capture: CaptureConfig::default(),
            render: RenderConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Overflow ring buffer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Samples the backlog can hold (default: 10000)
    pub capacity: usize,
    /// What to do when the backlog is full
    pub overflow: OverflowPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::DropNewest,
        }
    }
}

/// Handoff mailbox settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Samples in flight between the threads (default: 1)
    pub capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: handoff::DEFAULT_CAPACITY,
        }
    }
}

impl SnifferConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, SnifferError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), SnifferError> {
        if self.buffer.capacity == 0 {
            return Err(SnifferError::InvalidConfig(
                "buffer.capacity must be at least 1".to_string(),
            ));
        }
        if self.channel.capacity == 0 {
            return Err(SnifferError::InvalidConfig(
                "channel.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
